//! Practice Screen Widgets

mod pose_card;

pub use pose_card::PoseCard;
