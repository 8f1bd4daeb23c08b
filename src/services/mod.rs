pub mod drawing;
pub mod presence;
pub mod room;
