pub mod add;
pub mod cards;
pub mod due;
pub mod hardest;
pub mod preview;
pub mod review;
pub mod show;
pub mod stats;
