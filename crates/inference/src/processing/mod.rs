pub mod coco;
pub mod post;
pub mod pre;
