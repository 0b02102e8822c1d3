//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Folio Configuration

# Site
title: Folio
description: ''
author: Anonymous
language: en
copyright: '© {year} {author}'

# URL
url: http://example.com
root: /

# Directory
content_dir: content
public_dir: public
leetcode_dir: leetcode
pages_dir: pages

# Fail the build on a malformed front-matter block
strict: true

# Header links
menu:
  - label: About
    path: /about/

highlight:
  enable: true
  line_number: true
  languages: [cpp, python]
  light_theme: InspiredGitHub
  dark_theme: base16-ocean.dark

widgets:
  copy_revert_ms: 1000

theme:
  default_mode: light
  storage_key: theme
"#;

const INDEX_PAGE: &str = r#"---
title: Home
---

- [Site Notes](/site-notes/)
- [LeetCode](/leetcode/)
"#;

const ABOUT_PAGE: &str = r#"---
title: About
---

## Hello, you are here...

My name is John. I write down what I learn.
"#;

const SITE_NOTES_PAGE: &str = r#"---
title: Site Notes
---

# Site Notes

This site is generated from Markdown. Math works inline, like $e^{i\pi} + 1 = 0$,
and on its own line:

$$
\sum_{k=1}^{n} k = \frac{n(n+1)}{2}
$$

<details>
<summary>How is it built?</summary>

Every file is parsed, sanitized and rendered with the same pipeline.

</details>
"#;

const SAMPLE_SOLUTION: &str = r#"---
id: 1
title: Two Sum
diff: Easy
tags: [array, hash table]
---

## Solution

Walk the array once and remember where every value was seen.
Lookups take $O(1)$, so the whole pass is $O(n)$.

```cpp
vector<int> twoSum(vector<int>& nums, int target) {
    unordered_map<int, int> seen;
    for (int i = 0; i < nums.size(); i++) {
        auto it = seen.find(target - nums[i]);
        if (it != seen.end()) return {it->second, i};
        seen[nums[i]] = i;
    }
    return {};
}
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let pages = target_dir.join("content/pages");
    let leetcode = target_dir.join("content/leetcode");

    fs::create_dir_all(&pages)?;
    fs::create_dir_all(&leetcode)?;
    fs::create_dir_all(target_dir.join("static"))?;

    let files = [
        (target_dir.join("_config.yml"), CONFIG),
        (pages.join("index.md"), INDEX_PAGE),
        (pages.join("about.md"), ABOUT_PAGE),
        (pages.join("site-notes.md"), SITE_NOTES_PAGE),
        (leetcode.join("1.md"), SAMPLE_SOLUTION),
    ];

    for (path, content) in files {
        if path.exists() {
            tracing::warn!("Keeping existing {:?}", path);
            continue;
        }
        fs::write(&path, content)?;
        tracing::debug!("Created: {:?}", path);
    }

    Ok(())
}
