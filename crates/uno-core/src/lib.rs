pub mod card;
pub mod protocol;
pub mod rules;
pub mod view;
