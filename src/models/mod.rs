pub mod grid;
pub mod frame;
pub mod matrix;
pub mod point;
pub mod region;
pub mod symbol;

pub use grid::ModuleGrid;
pub use frame::GrayscaleImage;
pub use matrix::BitMatrix;
pub use point::Point;
pub use region::Region;
pub use symbol::{DecodedSymbol, MAX_MODULES, SYMBOL_SIZES, SymbolSize, SymbolStatus};
