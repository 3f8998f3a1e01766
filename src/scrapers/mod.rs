pub mod line_history;
pub mod listings;
pub mod next_data;
