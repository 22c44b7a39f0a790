mod block;
mod layout;
mod page;

pub use block::{new_id, Block, BlockBase, FontWeight, ImageBlock, TextBlock};
pub use layout::{LayoutError, ManualLayout};
pub use page::{Page, CANVAS_BOTTOM_PADDING};
