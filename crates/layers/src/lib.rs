pub mod choropleth;
pub mod country;
pub mod features;
pub mod layer;
pub mod series;
pub mod symbology;
pub mod vector;

pub use choropleth::*;
pub use country::*;
pub use features::*;
pub use layer::*;
pub use series::*;
pub use symbology::*;
