pub mod window_frame;
pub use window_frame::*;

pub mod count_win;
pub use count_win::*;

pub mod rank;
pub use rank::*;

pub mod row_number;
pub use row_number::*;
