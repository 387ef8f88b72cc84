pub mod genome;
pub mod interval;
pub mod record;
pub mod schema;
pub mod store;
pub mod strand;
pub mod table;
pub mod value;

pub use self::genome::{GenomeInfo, SeqnameStyle};
pub use self::interval::{Coord, Interval, Payload};
pub use self::record::Record;
pub use self::schema::{Column, Schema};
pub use self::store::IntervalStore;
pub use self::strand::Strand;
pub use self::table::Table;
pub use self::value::{ColumnType, Value};
