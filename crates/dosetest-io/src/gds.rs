//! GDS-II stream writer and reader.
//!
//! GDS-II is the binary layout format consumed by mask-making tools. The
//! writer turns a [`Library`] into a stream; the reader parses the same
//! subset back so exported files can be checked.
//!
//! ## GDS-II Record Structure
//! Each record: [2-byte length][1-byte record kind][1-byte data type][payload]
//! Hierarchy: HEADER → BGNLIB → (BGNSTR → BOUNDARY/PATH/SREF … → ENDSTR)* → ENDLIB

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dosetest_core::geometry::{BBox, DEFAULT_TOLERANCE};
use dosetest_core::{
    Cell, CellInstance, GeomPrimitive, LayerStack, Library, LibraryError, Path, Point, Polygon,
    Rect, Transform,
};

// ── GDS-II Record Types ──────────────────────────────────────────────

mod record_type {
    pub const HEADER: u16 = 0x0002;
    pub const BGNLIB: u16 = 0x0102;
    pub const LIBNAME: u16 = 0x0206;
    pub const UNITS: u16 = 0x0305;
    pub const ENDLIB: u16 = 0x0400;
    pub const BGNSTR: u16 = 0x0502;
    pub const STRNAME: u16 = 0x0606;
    pub const ENDSTR: u16 = 0x0700;
    pub const BOUNDARY: u16 = 0x0800;
    pub const PATH: u16 = 0x0900;
    pub const SREF: u16 = 0x0A00;
    pub const AREF: u16 = 0x0B00;
    pub const TEXT: u16 = 0x0C00;
    pub const LAYER: u16 = 0x0D02;
    pub const DATATYPE: u16 = 0x0E02;
    pub const WIDTH: u16 = 0x0F03;
    pub const XY: u16 = 0x1003;
    pub const ENDEL: u16 = 0x1100;
    pub const SNAME: u16 = 0x1206;
    pub const NODE: u16 = 0x1500;
    pub const STRANS: u16 = 0x1A01;
    pub const MAG: u16 = 0x1B05;
    pub const ANGLE: u16 = 0x1C05;
    pub const PATHTYPE: u16 = 0x2102;
    pub const BOX: u16 = 0x2D00;
}

// ── Data Type Tags ────────────────────────────────────────────────────

#[allow(dead_code)]
mod data_type {
    pub const NO_DATA: u8 = 0x00;
    pub const BIT_ARRAY: u8 = 0x01;
    pub const INT16: u8 = 0x02;
    pub const INT32: u8 = 0x03;
    pub const REAL8: u8 = 0x05;
    pub const ASCII: u8 = 0x06;
}

/// STRANS bit for reflection about the x axis.
const STRANS_REFLECT: u16 = 0x8000;

/// Largest payload a single record can carry.
const MAX_PAYLOAD: usize = u16::MAX as usize - 4;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum GdsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid GDS-II record at offset {offset}: {message}")]
    InvalidRecord { offset: u64, message: String },

    #[error("Unexpected record type 0x{record_type:04X}, expected 0x{expected:04X}")]
    UnexpectedRecord { record_type: u16, expected: u16 },

    #[error("Coordinate {0} µm does not fit the database grid")]
    CoordinateOutOfRange(f64),

    #[error("Layer {layer}/{datatype} does not fit a GDS-II layer record")]
    LayerOutOfRange { layer: u32, datatype: u16 },

    #[error("Cell '{0}' referenced but not defined")]
    UndefinedCell(String),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

// ── Options ───────────────────────────────────────────────────────────

/// Stream settings. Coordinates are in µm; one user unit is 1 µm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GdsOptions {
    /// Database grid in µm (1 nm by default).
    pub db_unit_in_um: f64,
    /// Modification/access time written to BGNLIB and BGNSTR:
    /// year, month, day, hour, minute, second.
    pub timestamp: [i16; 6],
    /// Maximum chord error when arcs are flattened, in µm.
    pub arc_tolerance: f64,
}

impl Default for GdsOptions {
    fn default() -> Self {
        Self {
            db_unit_in_um: 0.001,
            timestamp: [2024, 1, 1, 0, 0, 0],
            arc_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl GdsOptions {
    fn timestamp_pair(&self) -> [i16; 12] {
        let mut out = [0i16; 12];
        out[..6].copy_from_slice(&self.timestamp);
        out[6..].copy_from_slice(&self.timestamp);
        out
    }
}

// ── GDS-II Record ─────────────────────────────────────────────────────

#[derive(Debug)]
struct GdsRecord {
    record_type: u16,
    offset: u64,
    data: Vec<u8>,
}

impl GdsRecord {
    /// Data type tag (lower byte).
    fn data_type_tag(&self) -> u8 {
        (self.record_type & 0xFF) as u8
    }

    fn expect_tag(&self, tag: u8) -> Result<(), GdsError> {
        if self.data_type_tag() != tag {
            return Err(GdsError::InvalidRecord {
                offset: self.offset,
                message: format!(
                    "record 0x{:04X} carries data type {}, expected {}",
                    self.record_type,
                    self.data_type_tag(),
                    tag
                ),
            });
        }
        Ok(())
    }

    fn as_i16_vec(&self) -> Result<Vec<i16>, GdsError> {
        if self.data_type_tag() != data_type::BIT_ARRAY {
            self.expect_tag(data_type::INT16)?;
        }
        Ok(self
            .data
            .chunks_exact(2)
            .map(|c| i16::from_be_bytes([c[0], c[1]]))
            .collect())
    }

    fn as_i32_vec(&self) -> Result<Vec<i32>, GdsError> {
        self.expect_tag(data_type::INT32)?;
        Ok(self
            .data
            .chunks_exact(4)
            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn as_string(&self) -> Result<String, GdsError> {
        self.expect_tag(data_type::ASCII)?;
        let s: String = self.data.iter().map(|&b| b as char).collect();
        Ok(s.trim_end_matches('\0').to_string())
    }

    fn as_f64_vec(&self) -> Result<Vec<f64>, GdsError> {
        self.expect_tag(data_type::REAL8)?;
        Ok(self
            .data
            .chunks_exact(8)
            .map(|c| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(c);
                gds_real8_to_f64(&bytes)
            })
            .collect())
    }

    fn first_i16(&self) -> Result<i16, GdsError> {
        self.as_i16_vec()?
            .first()
            .copied()
            .ok_or_else(|| self.empty_payload())
    }

    /// First value as a layer number; negative values are rejected.
    fn first_u32(&self) -> Result<u32, GdsError> {
        let value = self.first_i16()?;
        u32::try_from(value).map_err(|_| GdsError::InvalidRecord {
            offset: self.offset,
            message: format!("record 0x{:04X} holds negative value {}", self.record_type, value),
        })
    }

    fn first_f64(&self) -> Result<f64, GdsError> {
        self.as_f64_vec()?
            .first()
            .copied()
            .ok_or_else(|| self.empty_payload())
    }

    fn empty_payload(&self) -> GdsError {
        GdsError::InvalidRecord {
            offset: self.offset,
            message: format!("record 0x{:04X} has no payload", self.record_type),
        }
    }
}

/// Convert GDS-II excess-64 real format to IEEE 754 f64.
fn gds_real8_to_f64(bytes: &[u8; 8]) -> f64 {
    if bytes.iter().all(|&b| b == 0) {
        return 0.0;
    }

    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = (bytes[0] & 0x7F) as i32 - 64;

    let mantissa = bytes[1..]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64);

    let mantissa_f = mantissa as f64 / (1u64 << 56) as f64;
    sign * mantissa_f * 16.0_f64.powi(exponent)
}

/// Convert IEEE 754 f64 to GDS-II excess-64 real format.
fn f64_to_gds_real8(value: f64) -> [u8; 8] {
    if value == 0.0 {
        return [0u8; 8];
    }

    let sign_bit: u8 = if value < 0.0 { 0x80 } else { 0x00 };
    let mut val = value.abs();

    // 1/16 <= mantissa < 1
    let mut exponent: i32 = 0;
    while val >= 1.0 && exponent < 63 {
        val /= 16.0;
        exponent += 1;
    }
    while val < 1.0 / 16.0 && exponent > -64 {
        val *= 16.0;
        exponent -= 1;
    }

    let mut mantissa = (val * (1u64 << 56) as f64).round() as u64;
    if mantissa >= 1u64 << 56 {
        mantissa >>= 4;
        exponent += 1;
    }
    let mut result = [0u8; 8];
    result[0] = sign_bit | ((exponent + 64) as u8 & 0x7F);
    result[1..].copy_from_slice(&mantissa.to_be_bytes()[1..]);
    result
}

/// Axis-aligned rectangle test on an open vertex ring: four edges, each
/// horizontal or vertical, alternating.
fn as_axis_aligned_rect(points: &[Point]) -> Option<BBox> {
    if points.len() != 4 {
        return None;
    }
    let horizontal = |a: &Point, b: &Point| a.y == b.y && a.x != b.x;
    let vertical = |a: &Point, b: &Point| a.x == b.x && a.y != b.y;
    let edge = |i: usize| (&points[i], &points[(i + 1) % 4]);

    let starts_horizontal = {
        let (a, b) = edge(0);
        horizontal(a, b)
    };
    let alternating = (0..4).all(|i| {
        let (a, b) = edge(i);
        if (i % 2 == 0) == starts_horizontal {
            horizontal(a, b)
        } else {
            vertical(a, b)
        }
    });
    if alternating {
        BBox::from_points(points)
    } else {
        None
    }
}

// ── GDS-II Writer ─────────────────────────────────────────────────────

pub struct GdsWriter<W: Write> {
    writer: W,
    options: GdsOptions,
}

impl<W: Write> GdsWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, GdsOptions::default())
    }

    pub fn with_options(writer: W, options: GdsOptions) -> Self {
        Self { writer, options }
    }

    /// Write every cell of the library, in library order.
    pub fn write(&mut self, lib: &Library) -> Result<(), GdsError> {
        self.write_i16_record(record_type::HEADER, &[600])?; // GDS version 6
        let stamp = self.options.timestamp_pair();
        self.write_i16_record(record_type::BGNLIB, &stamp)?;
        self.write_string_record(record_type::LIBNAME, &lib.name)?;
        self.write_units()?;

        for cell in lib.all_cells() {
            self.write_cell(cell, &lib.layer_stack)?;
        }

        self.write_record(record_type::ENDLIB, &[])?;
        self.writer.flush()?;
        log::info!("Wrote library '{}' ({} cells)", lib.name, lib.cell_count());
        Ok(())
    }

    fn write_record(&mut self, record_type: u16, data: &[u8]) -> Result<(), GdsError> {
        if data.len() > MAX_PAYLOAD {
            return Err(GdsError::InvalidRecord {
                offset: 0,
                message: format!(
                    "payload of {} bytes for record 0x{:04X} exceeds the record limit",
                    data.len(),
                    record_type
                ),
            });
        }
        let total_len = (data.len() + 4) as u16;
        self.writer.write_all(&total_len.to_be_bytes())?;
        self.writer.write_all(&record_type.to_be_bytes())?;
        self.writer.write_all(data)?;
        Ok(())
    }

    fn write_i16_record(&mut self, record_type: u16, values: &[i16]) -> Result<(), GdsError> {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.write_record(record_type, &data)
    }

    fn write_i32_record(&mut self, record_type: u16, values: &[i32]) -> Result<(), GdsError> {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.write_record(record_type, &data)
    }

    fn write_string_record(&mut self, record_type: u16, s: &str) -> Result<(), GdsError> {
        let mut data: Vec<u8> = s.bytes().collect();
        // GDS strings must be even length
        if data.len() % 2 != 0 {
            data.push(0);
        }
        self.write_record(record_type, &data)
    }

    fn write_real8_record(&mut self, record_type: u16, values: &[f64]) -> Result<(), GdsError> {
        let data: Vec<u8> = values.iter().flat_map(|v| f64_to_gds_real8(*v)).collect();
        self.write_record(record_type, &data)
    }

    fn write_units(&mut self) -> Result<(), GdsError> {
        // database unit in user units (µm), database unit in meters
        let db = self.options.db_unit_in_um;
        self.write_real8_record(record_type::UNITS, &[db, db * 1e-6])
    }

    fn to_dbu(&self, value: f64) -> Result<i32, GdsError> {
        let scaled = (value / self.options.db_unit_in_um).round();
        if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(GdsError::CoordinateOutOfRange(value));
        }
        Ok(scaled as i32)
    }

    fn to_dbu_points(&self, points: &[Point]) -> Result<Vec<(i32, i32)>, GdsError> {
        points
            .iter()
            .map(|p| Ok((self.to_dbu(p.x)?, self.to_dbu(p.y)?)))
            .collect()
    }

    fn write_cell(&mut self, cell: &Cell, layers: &LayerStack) -> Result<(), GdsError> {
        let stamp = self.options.timestamp_pair();
        self.write_i16_record(record_type::BGNSTR, &stamp)?;
        self.write_string_record(record_type::STRNAME, &cell.name)?;

        for geom in &cell.geometries {
            match geom {
                GeomPrimitive::Rect(rect) => {
                    self.write_boundary(rect.layer_id, &rect.corners(), layers)?
                }
                GeomPrimitive::Polygon(poly) => {
                    self.write_boundary(poly.layer_id, &poly.vertices, layers)?
                }
                GeomPrimitive::Path(path) => self.write_path(path, layers)?,
            }
        }

        for inst in &cell.instances {
            self.write_sref(inst)?;
        }

        self.write_record(record_type::ENDSTR, &[])?;
        log::debug!(
            "Wrote cell '{}': {} elements, {} references",
            cell.name,
            cell.geometry_count(),
            cell.instance_count()
        );
        Ok(())
    }

    fn write_layer(&mut self, layer_id: u32, layers: &LayerStack) -> Result<(), GdsError> {
        let datatype = layers.datatype_for(layer_id);
        let out_of_range = || GdsError::LayerOutOfRange {
            layer: layer_id,
            datatype,
        };
        let layer = i16::try_from(layer_id).map_err(|_| out_of_range())?;
        let datatype = i16::try_from(datatype).map_err(|_| out_of_range())?;
        self.write_i16_record(record_type::LAYER, &[layer])?;
        self.write_i16_record(record_type::DATATYPE, &[datatype])
    }

    fn write_boundary(
        &mut self,
        layer_id: u32,
        vertices: &[Point],
        layers: &LayerStack,
    ) -> Result<(), GdsError> {
        let ring = self.to_dbu_points(vertices)?;
        let Some(&first) = ring.first() else {
            return Ok(());
        };

        self.write_record(record_type::BOUNDARY, &[])?;
        self.write_layer(layer_id, layers)?;
        // closed ring: first point repeated
        let coords: Vec<i32> = ring
            .iter()
            .chain(std::iter::once(&first))
            .flat_map(|&(x, y)| [x, y])
            .collect();
        self.write_i32_record(record_type::XY, &coords)?;
        self.write_record(record_type::ENDEL, &[])
    }

    fn write_path(&mut self, path: &Path, layers: &LayerStack) -> Result<(), GdsError> {
        let mut points = self.to_dbu_points(&path.centerline(self.options.arc_tolerance))?;
        points.dedup();
        if points.len() < 2 {
            log::warn!("Skipping path with fewer than two distinct points");
            return Ok(());
        }

        self.write_record(record_type::PATH, &[])?;
        self.write_layer(path.layer_id, layers)?;
        self.write_i16_record(record_type::PATHTYPE, &[0])?;
        let width = self.to_dbu(path.width)?;
        self.write_i32_record(record_type::WIDTH, &[width])?;
        let coords: Vec<i32> = points.iter().flat_map(|&(x, y)| [x, y]).collect();
        self.write_i32_record(record_type::XY, &coords)?;
        self.write_record(record_type::ENDEL, &[])
    }

    fn write_sref(&mut self, inst: &CellInstance) -> Result<(), GdsError> {
        let t = &inst.transform;

        self.write_record(record_type::SREF, &[])?;
        self.write_string_record(record_type::SNAME, &inst.cell_name)?;

        if !t.is_translation() {
            let flags = if t.mirror_x { STRANS_REFLECT } else { 0 };
            self.write_i16_record(record_type::STRANS, &[flags as i16])?;
            if t.scale != 1.0 {
                self.write_real8_record(record_type::MAG, &[t.scale])?;
            }
            if t.rotation != 0.0 {
                self.write_real8_record(record_type::ANGLE, &[t.rotation])?;
            }
        }

        let x = self.to_dbu(t.offset.x)?;
        let y = self.to_dbu(t.offset.y)?;
        self.write_i32_record(record_type::XY, &[x, y])?;
        self.write_record(record_type::ENDEL, &[])
    }
}

/// Write a library to `path`. Failures creating or writing the file are
/// returned as [`GdsError::Io`].
pub fn write_gds_file(
    path: impl AsRef<FsPath>,
    lib: &Library,
    options: &GdsOptions,
) -> Result<(), GdsError> {
    let file = File::create(path.as_ref())?;
    let mut writer = GdsWriter::with_options(BufWriter::new(file), options.clone());
    writer.write(lib)?;
    log::info!("Saved {}", path.as_ref().display());
    Ok(())
}

// ── GDS-II Reader ─────────────────────────────────────────────────────

/// Records collected between an element header and its ENDEL.
#[derive(Default)]
struct ElementRecords {
    layer: u32,
    width: f64,
    points: Vec<Point>,
    sname: String,
    strans: u16,
    mag: Option<f64>,
    angle: Option<f64>,
}

pub struct GdsReader<R: Read> {
    reader: R,
    offset: u64,
    db_unit_in_um: f64,
}

impl<R: Read> GdsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            db_unit_in_um: 0.001, // 1 nm until UNITS says otherwise
        }
    }

    /// Read the stream into a library. References are resolved by name
    /// once every structure is known.
    pub fn read(&mut self) -> Result<Library, GdsError> {
        let header = self.expect_record()?;
        if header.record_type != record_type::HEADER {
            return Err(GdsError::UnexpectedRecord {
                record_type: header.record_type,
                expected: record_type::HEADER,
            });
        }
        log::debug!("GDS-II version: {:?}", header.as_i16_vec()?.first());

        let mut name = String::from("imported");
        let mut cells: Vec<Cell> = Vec::new();
        loop {
            let rec = self.expect_record()?;
            match rec.record_type {
                record_type::LIBNAME => name = rec.as_string()?,
                record_type::UNITS => {
                    let units = rec.as_f64_vec()?;
                    if let Some(&db_in_m) = units.get(1) {
                        self.db_unit_in_um = db_in_m * 1e6;
                    }
                }
                record_type::BGNSTR => cells.push(self.read_structure()?),
                record_type::ENDLIB => break,
                _ => {}
            }
        }

        let lib = assemble_library(&name, cells)?;
        log::info!("Read library '{}' ({} cells)", lib.name, lib.cell_count());
        Ok(lib)
    }

    fn read_record(&mut self) -> Result<Option<GdsRecord>, GdsError> {
        let mut len_buf = [0u8; 2];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(GdsError::Io(e)),
        }

        let offset = self.offset;
        let total_len = u16::from_be_bytes(len_buf) as usize;
        if total_len < 4 || total_len % 2 != 0 {
            return Err(GdsError::InvalidRecord {
                offset,
                message: format!("record length {} is invalid", total_len),
            });
        }

        let mut type_buf = [0u8; 2];
        self.reader.read_exact(&mut type_buf)?;
        let record_type = u16::from_be_bytes(type_buf);

        let mut data = vec![0u8; total_len - 4];
        self.reader.read_exact(&mut data)?;
        self.offset += total_len as u64;

        Ok(Some(GdsRecord {
            record_type,
            offset,
            data,
        }))
    }

    fn expect_record(&mut self) -> Result<GdsRecord, GdsError> {
        let offset = self.offset;
        self.read_record()?.ok_or(GdsError::InvalidRecord {
            offset,
            message: "unexpected end of stream".into(),
        })
    }

    fn read_structure(&mut self) -> Result<Cell, GdsError> {
        let mut cell = Cell::new("unnamed");

        loop {
            let rec = self.expect_record()?;
            match rec.record_type {
                record_type::STRNAME => cell.name = rec.as_string()?,
                record_type::BOUNDARY | record_type::BOX => {
                    let el = self.read_element()?;
                    if let Some(geom) = boundary_to_geometry(el) {
                        cell.add_geometry(geom);
                    }
                }
                record_type::PATH => {
                    let el = self.read_element()?;
                    if !el.points.is_empty() {
                        cell.add_geometry(GeomPrimitive::Path(Path::polyline(
                            el.layer, &el.points, el.width,
                        )));
                    }
                }
                record_type::SREF => {
                    let el = self.read_element()?;
                    if !el.sname.is_empty() {
                        cell.add_instance(sref_to_instance(el));
                    }
                }
                record_type::TEXT | record_type::NODE | record_type::AREF => {
                    log::debug!("Skipping element 0x{:04X} in '{}'", rec.record_type, cell.name);
                    self.read_element()?;
                }
                record_type::ENDSTR => break,
                _ => {}
            }
        }

        log::debug!("Read cell '{}'", cell.name);
        Ok(cell)
    }

    fn read_element(&mut self) -> Result<ElementRecords, GdsError> {
        let mut el = ElementRecords::default();
        loop {
            let rec = self.expect_record()?;
            match rec.record_type {
                record_type::LAYER => el.layer = rec.first_u32()?,
                record_type::WIDTH => {
                    if let Some(&w) = rec.as_i32_vec()?.first() {
                        // negative width means absolute width; magnitude is what we keep
                        el.width = (w as f64 * self.db_unit_in_um).abs();
                    }
                }
                record_type::XY => {
                    el.points = rec
                        .as_i32_vec()?
                        .chunks_exact(2)
                        .map(|pair| {
                            Point::new(
                                pair[0] as f64 * self.db_unit_in_um,
                                pair[1] as f64 * self.db_unit_in_um,
                            )
                        })
                        .collect();
                }
                record_type::SNAME => el.sname = rec.as_string()?,
                record_type::STRANS => el.strans = rec.first_i16()? as u16,
                record_type::MAG => el.mag = Some(rec.first_f64()?),
                record_type::ANGLE => el.angle = Some(rec.first_f64()?),
                record_type::ENDEL => break,
                _ => {}
            }
        }
        Ok(el)
    }
}

fn boundary_to_geometry(el: ElementRecords) -> Option<GeomPrimitive> {
    let mut points = el.points;
    // boundaries repeat the first point
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.is_empty() {
        return None;
    }

    match as_axis_aligned_rect(&points) {
        Some(bb) => Some(GeomPrimitive::Rect(Rect::new(
            el.layer, bb.min.x, bb.min.y, bb.max.x, bb.max.y,
        ))),
        None => Some(GeomPrimitive::Polygon(Polygon::new(el.layer, points))),
    }
}

fn sref_to_instance(el: ElementRecords) -> CellInstance {
    let transform = Transform {
        offset: el.points.first().copied().unwrap_or_else(Point::origin),
        rotation: el.angle.unwrap_or(0.0),
        mirror_x: el.strans & STRANS_REFLECT != 0,
        scale: el.mag.unwrap_or(1.0),
    };
    // target id is filled in once all structures are read
    CellInstance::new(uuid::Uuid::nil(), &el.sname, transform)
}

/// Resolve reference targets by name and pick the top cell: the first cell
/// no other cell references.
fn assemble_library(name: &str, mut cells: Vec<Cell>) -> Result<Library, GdsError> {
    let ids: HashMap<String, uuid::Uuid> =
        cells.iter().map(|c| (c.name.clone(), c.id)).collect();

    for cell in &mut cells {
        for inst in &mut cell.instances {
            inst.cell_id = *ids
                .get(&inst.cell_name)
                .ok_or_else(|| GdsError::UndefinedCell(inst.cell_name.clone()))?;
        }
    }

    let top = cells
        .iter()
        .find(|c| {
            !cells
                .iter()
                .any(|other| other.instances.iter().any(|i| i.cell_id == c.id))
        })
        .map(|c| c.id);

    let mut lib = Library::new(name);
    for cell in cells {
        lib.add_cell(cell);
    }
    if let Some(top) = top {
        lib.set_top_cell(top)?;
    }
    Ok(lib)
}

/// Read a library from `path`.
pub fn read_gds_file(path: impl AsRef<FsPath>) -> Result<Library, GdsError> {
    let file = File::open(path.as_ref())?;
    GdsReader::new(BufReader::new(file)).read()
}
