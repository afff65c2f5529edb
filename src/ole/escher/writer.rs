//! Escher record writing utilities.
//!
//! Provides the OfficeArt records an XLS worksheet needs to carry cell
//! comments: drawing group and drawing containers, the patriarch group shape
//! and one text box shape per note. Based on MS-ODRAW specification.

use bitflags::bitflags;
use std::io::{self, Write};
use zerocopy::IntoBytes;
use zerocopy_derive::*;

// =============================================================================
// Shape Flags (MS-ODRAW 2.2.40)
// =============================================================================

bitflags! {
    /// Shape flags for EscherSpRecord (MS-ODRAW 2.2.40)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShapeFlags: u32 {
        /// Shape is a group
        const GROUP = 0x0001;
        /// Shape is a child of a group
        const CHILD = 0x0002;
        /// Shape is the topmost group (patriarch)
        const PATRIARCH = 0x0004;
        /// Shape has an anchor
        const HAVE_ANCHOR = 0x0200;
        /// Shape has a shape type property
        const HAVE_SPT = 0x0800;
    }
}

// =============================================================================
// Escher Record Types Constants
// =============================================================================

pub mod record_type {
    pub const DGG_CONTAINER: u16 = 0xF000;
    pub const DG_CONTAINER: u16 = 0xF002;
    pub const SPGR_CONTAINER: u16 = 0xF003;
    pub const SP_CONTAINER: u16 = 0xF004;
    pub const DGG: u16 = 0xF006;
    pub const DG: u16 = 0xF008;
    pub const SPGR: u16 = 0xF009;
    pub const SP: u16 = 0xF00A;
    pub const OPT: u16 = 0xF00B;
    pub const CLIENT_TEXTBOX: u16 = 0xF00D;
    pub const CLIENT_ANCHOR: u16 = 0xF010;
    pub const CLIENT_DATA: u16 = 0xF011;
    pub const SPLIT_MENU_COLORS: u16 = 0xF11E;
}

// =============================================================================
// Shape Type Constants (MS-ODRAW 2.4.6 MSOSPT)
// =============================================================================

pub mod shape_type {
    pub const NOT_PRIMITIVE: u16 = 0;
    pub const TEXT_BOX: u16 = 202;
}

// =============================================================================
// Property Constants
// =============================================================================

pub mod prop_id {
    pub const TEXT_ID: u16 = 0x0080;
    pub const TEXT_BOOLEANS: u16 = 0x00BF;
    pub const FILL_COLOR: u16 = 0x0181;
    pub const FILL_BACK_COLOR: u16 = 0x0183;
    pub const FILL_BOOLEANS: u16 = 0x01BF;
    pub const LINE_COLOR: u16 = 0x01C0;
    pub const SHADOW_COLOR: u16 = 0x0201;
    pub const SHADOW_BOOLEANS: u16 = 0x023F;
    pub const GROUP_BOOLEANS: u16 = 0x03BF;
}

pub mod prop_value {
    pub const SCHEME_COLOR: u32 = 0x0800_0000;
    /// Tooltip yellow used for comment boxes
    pub const NOTE_FILL: u32 = SCHEME_COLOR | 0x50;
    pub const NOTE_LINE: u32 = SCHEME_COLOR | 0x51;
    pub const DEFAULT_FILL: u32 = SCHEME_COLOR | 0x41;
    pub const DEFAULT_LINE: u32 = SCHEME_COLOR | 0x40;
    pub const TEXT_BOOL_FIT_TO_SHAPE: u32 = 0x0008_0008;
    pub const FILL_BOOL_DEFAULT: u32 = 0x0010_0010;
    pub const SHADOW_BOOL_ON: u32 = 0x0003_0003;
    pub const GROUP_BOOL_HIDDEN: u32 = 0x0002_0002;
}

// =============================================================================
// Zerocopy Data Structures
// =============================================================================

/// Escher record header (8 bytes) - zerocopy compatible
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EscherRecordHeader {
    pub ver_inst: u16,
    pub rec_type: u16,
    pub length: u32,
}

impl EscherRecordHeader {
    pub const SIZE: usize = 8;

    pub const fn new(version: u8, instance: u16, rec_type: u16, length: u32) -> Self {
        let ver_inst = (version as u16 & 0x0F) | ((instance & 0x0FFF) << 4);
        Self {
            ver_inst,
            rec_type,
            length,
        }
    }

    pub const fn container(rec_type: u16, length: u32) -> Self {
        Self::new(0x0F, 0, rec_type, length)
    }
}

/// Shape record data (8 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct EscherSpData {
    pub spid: u32,
    pub flags: u32,
}

impl EscherSpData {
    pub const fn with_flags(spid: u32, flags: ShapeFlags) -> Self {
        Self {
            spid,
            flags: flags.bits(),
        }
    }
}

/// Property entry (6 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EscherProperty {
    pub prop_id: u16,
    pub value: u32,
}

impl EscherProperty {
    pub const fn new(prop_id: u16, value: u32) -> Self {
        Self { prop_id, value }
    }
}

/// Spreadsheet client anchor (MS-XLS 2.5.193 OfficeArtClientAnchorSheet), 18 bytes.
///
/// Columns and rows are cell indices; the `dx`/`dy` offsets are in 1/1024 of
/// the column width and 1/256 of the row height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SheetAnchor {
    pub flags: u16,
    pub col1: u16,
    pub dx1: u16,
    pub row1: u16,
    pub dy1: u16,
    pub col2: u16,
    pub dx2: u16,
    pub row2: u16,
    pub dy2: u16,
}

impl SheetAnchor {
    pub const SIZE: usize = 18;

    /// The box Excel places next to a commented cell: starting one column to
    /// the right, spanning two columns and four rows, clamped to the grid.
    pub fn note_box(row: u16, col: u16) -> Self {
        Self {
            // move with cells, do not size with cells
            flags: 0x0003,
            col1: col.saturating_add(1).min(255),
            dx1: 15,
            row1: row,
            dy1: 10,
            col2: col.saturating_add(3).min(255),
            dx2: 15,
            row2: row.saturating_add(4),
            dy2: 4,
        }
    }
}

/// Shape ids in one file id cluster (FIDCL) of the drawing group.
pub const SPIDS_PER_CLUSTER: u32 = 1024;

/// Shape-id bookkeeping for one drawing (one per worksheet carrying shapes).
///
/// A drawing owns consecutive blocks of [`SPIDS_PER_CLUSTER`] ids starting at
/// `first_block`; the drawing group lists one FIDCL per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingCluster {
    /// Drawing id (1-based)
    pub drawing_id: u32,
    /// Index of the first id block owned by the drawing (1-based)
    pub first_block: u32,
    /// Shapes in the drawing, including the patriarch group
    pub shape_count: u32,
}

impl DrawingCluster {
    pub const fn block_count(&self) -> u32 {
        self.shape_count.div_ceil(SPIDS_PER_CLUSTER)
    }

    /// First block free for the next drawing.
    pub const fn next_block(&self) -> u32 {
        self.first_block + self.block_count()
    }

    pub const fn base_spid(&self) -> u32 {
        self.first_block * SPIDS_PER_CLUSTER
    }

    pub const fn last_spid(&self) -> u32 {
        self.base_spid() + self.shape_count - 1
    }

    /// FIDCL entries as (drawing id, ids used in the block).
    pub fn id_clusters(&self) -> impl Iterator<Item = (u32, u32)> {
        let DrawingCluster {
            drawing_id,
            shape_count,
            ..
        } = *self;
        (0..self.block_count()).map(move |block| {
            let used = shape_count - block * SPIDS_PER_CLUSTER;
            (drawing_id, used.min(SPIDS_PER_CLUSTER))
        })
    }
}

// =============================================================================
// Writing Functions
// =============================================================================

/// Write an Escher record header (8 bytes).
///
/// # Format
///
/// - Bytes 0-1: Version (4 bits) | Instance (12 bits)
/// - Bytes 2-3: Record Type
/// - Bytes 4-7: Record Length (32-bit)
pub fn write_record_header<W: Write>(
    writer: &mut W,
    version: u8,
    instance: u16,
    record_type: u16,
    length: u32,
) -> io::Result<()> {
    let header = EscherRecordHeader::new(version, instance, record_type, length);
    writer.write_all(header.as_bytes())
}

/// Write a simple atom record.
pub fn write_atom<W: Write>(
    writer: &mut W,
    version: u8,
    instance: u16,
    record_type: u16,
    data: &[u8],
) -> io::Result<()> {
    write_record_header(writer, version, instance, record_type, data.len() as u32)?;
    writer.write_all(data)
}

/// Helper to build property records (Opt records).
///
/// Properties are written sorted by id, as Office expects.
#[derive(Debug, Default)]
pub struct PropertyBuilder {
    properties: Vec<EscherProperty>,
}

impl PropertyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simple property.
    pub fn add_simple(mut self, property_id: u16, value: u32) -> Self {
        self.properties.push(EscherProperty::new(property_id, value));
        self
    }

    /// Write the Opt record.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut sorted = self.properties.clone();
        sorted.sort_by_key(|p| p.prop_id);

        let num_properties = sorted.len() as u16;
        write_record_header(
            writer,
            0x03,
            num_properties,
            record_type::OPT,
            (sorted.len() * 6) as u32,
        )?;
        for property in &sorted {
            writer.write_all(property.as_bytes())?;
        }
        Ok(())
    }

    /// Get the total size that would be written.
    pub fn size(&self) -> usize {
        EscherRecordHeader::SIZE + self.properties.len() * 6
    }
}

/// Helper to build shape records.
pub struct ShapeBuilder {
    shape_type: u16,
    shape_id: u32,
    flags: ShapeFlags,
}

impl ShapeBuilder {
    pub const SIZE: usize = EscherRecordHeader::SIZE + 8;

    pub fn new(shape_type: u16, shape_id: u32) -> Self {
        Self {
            shape_type,
            shape_id,
            flags: ShapeFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: ShapeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Write the Sp record.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let data = EscherSpData::with_flags(self.shape_id, self.flags);
        write_atom(writer, 0x02, self.shape_type, record_type::SP, data.as_bytes())
    }
}

/// Write a spreadsheet ClientAnchor record.
pub fn write_client_anchor<W: Write>(writer: &mut W, anchor: &SheetAnchor) -> io::Result<()> {
    write_atom(writer, 0x00, 0, record_type::CLIENT_ANCHOR, anchor.as_bytes())
}

/// Write an Spgr record (group shape coordinates).
pub fn write_spgr<W: Write>(
    writer: &mut W,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
) -> io::Result<()> {
    write_record_header(writer, 0x01, 0, record_type::SPGR, 16)?;
    writer.write_all(&left.to_le_bytes())?;
    writer.write_all(&top.to_le_bytes())?;
    writer.write_all(&right.to_le_bytes())?;
    writer.write_all(&bottom.to_le_bytes())?;
    Ok(())
}

/// Write a Dg record (drawing atom). The drawing id travels in the instance.
pub fn write_dg<W: Write>(writer: &mut W, cluster: &DrawingCluster) -> io::Result<()> {
    write_record_header(writer, 0x00, cluster.drawing_id as u16, record_type::DG, 8)?;
    writer.write_all(&cluster.shape_count.to_le_bytes())?;
    writer.write_all(&cluster.last_spid().to_le_bytes())?;
    Ok(())
}

/// Write the patriarch group SpContainer that opens every drawing.
pub fn write_patriarch<W: Write>(writer: &mut W, spid: u32) -> io::Result<()> {
    let body = (EscherRecordHeader::SIZE + 16 + ShapeBuilder::SIZE) as u32;
    writer.write_all(EscherRecordHeader::container(record_type::SP_CONTAINER, body).as_bytes())?;
    write_spgr(writer, 0, 0, 0, 0)?;
    ShapeBuilder::new(shape_type::NOT_PRIMITIVE, spid)
        .with_flags(ShapeFlags::GROUP | ShapeFlags::PATRIARCH)
        .write(writer)
}

/// Size of [`write_patriarch`] output in bytes.
pub const PATRIARCH_SIZE: usize = EscherRecordHeader::SIZE * 2 + 16 + ShapeBuilder::SIZE;

/// Write the DggContainer stored in the workbook's MSODRAWINGGROUP record.
pub fn write_dgg_container<W: Write>(
    writer: &mut W,
    clusters: &[DrawingCluster],
) -> io::Result<()> {
    let fidcls: Vec<(u32, u32)> = clusters.iter().flat_map(DrawingCluster::id_clusters).collect();
    let dgg_len = 16 + fidcls.len() * 8;
    let opt = PropertyBuilder::new()
        .add_simple(prop_id::TEXT_BOOLEANS, prop_value::TEXT_BOOL_FIT_TO_SHAPE)
        .add_simple(prop_id::FILL_COLOR, prop_value::DEFAULT_FILL)
        .add_simple(prop_id::LINE_COLOR, prop_value::DEFAULT_LINE);
    let split_menu_len = 16;
    let total = EscherRecordHeader::SIZE
        + dgg_len
        + opt.size()
        + EscherRecordHeader::SIZE
        + split_menu_len;

    writer.write_all(
        EscherRecordHeader::container(record_type::DGG_CONTAINER, total as u32).as_bytes(),
    )?;

    let spid_max = clusters
        .iter()
        .map(|c| c.last_spid() + 1)
        .max()
        .unwrap_or(SPIDS_PER_CLUSTER);
    let shapes_saved: u32 = clusters.iter().map(|c| c.shape_count).sum();
    write_record_header(writer, 0x00, 0, record_type::DGG, dgg_len as u32)?;
    writer.write_all(&spid_max.to_le_bytes())?;
    // cidcl counts one more than the FIDCLs that follow
    writer.write_all(&(fidcls.len() as u32 + 1).to_le_bytes())?;
    writer.write_all(&shapes_saved.to_le_bytes())?;
    writer.write_all(&(clusters.len() as u32).to_le_bytes())?;
    for (drawing_id, used) in &fidcls {
        writer.write_all(&drawing_id.to_le_bytes())?;
        writer.write_all(&used.to_le_bytes())?;
    }

    opt.write(writer)?;

    write_record_header(writer, 0x00, 4, record_type::SPLIT_MENU_COLORS, split_menu_len as u32)?;
    for color in [0x0800_000Du32, 0x0800_000C, 0x0800_0017, 0x1000_00F7] {
        writer.write_all(&color.to_le_bytes())?;
    }
    Ok(())
}
