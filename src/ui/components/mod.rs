pub mod bookmarks;
pub mod menu;
pub mod picker;
pub mod question_view;
pub mod results;
pub mod timer_bar;
