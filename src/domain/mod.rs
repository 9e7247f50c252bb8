pub mod assignment;
pub mod calendar;
pub mod timebox;
pub mod velocity;
pub mod work_item;
