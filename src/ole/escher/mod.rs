//! OfficeArt (Escher) drawing records.
//!
//! XLS worksheets keep their shapes, including the text boxes behind cell
//! comments, in an Escher drawing split across MSODRAWING records. This module
//! holds the record layouts and writers.

pub mod writer;

pub use writer::{
    DrawingCluster, EscherRecordHeader, PATRIARCH_SIZE, PropertyBuilder, ShapeBuilder, ShapeFlags,
    SPIDS_PER_CLUSTER, SheetAnchor, prop_id, prop_value, record_type, shape_type, write_client_anchor,
    write_dgg_container, write_dg, write_patriarch, write_record_header,
};
