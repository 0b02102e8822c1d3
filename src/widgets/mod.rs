//! Interactive widgets attached to rendered nodes

pub mod copy;
pub mod disclosure;

pub use copy::{Clipboard, ClipboardError, CopyAffordance, CopyState, MemoryClipboard};
pub use disclosure::DisclosureState;
