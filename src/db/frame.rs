//! CQL native protocol v4 framing.
//!
//! Only the subset the shell needs: STARTUP and QUERY requests, and the
//! READY, AUTHENTICATE, ERROR and RESULT responses.
//!
//! Frame layout: `version:u8 flags:u8 stream:i16 opcode:u8 length:u32 body`.

use super::{ColumnSpec, ColumnType, ColumnValue, Consistency, ResultSet, Row};
use crate::error::{CqlError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

/// Protocol version sent in request headers.
pub const PROTOCOL_VERSION: u8 = 0x04;

/// Bit set in the version byte of every response.
const RESPONSE_BIT: u8 = 0x80;

/// Size of a frame header.
pub const HEADER_LEN: usize = 9;

/// Largest body accepted from a server (256 MiB, the protocol maximum).
pub const MAX_BODY_LEN: usize = 256 * 1024 * 1024;

const CQL_VERSION: &str = "3.0.0";

// Header flags.
const FLAG_COMPRESSION: u8 = 0x01;
const FLAG_TRACING: u8 = 0x02;
const FLAG_CUSTOM_PAYLOAD: u8 = 0x04;
const FLAG_WARNING: u8 = 0x08;

// Rows metadata flags.
const ROWS_GLOBAL_TABLES_SPEC: i32 = 0x0001;
const ROWS_HAS_MORE_PAGES: i32 = 0x0002;
const ROWS_NO_METADATA: i32 = 0x0004;

/// Deepest nesting of collection, tuple and UDT types accepted in metadata.
const MAX_TYPE_DEPTH: usize = 32;

/// Frame opcodes used by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Error = 0x00,
    Startup = 0x01,
    Ready = 0x02,
    Authenticate = 0x03,
    Query = 0x07,
    Result = 0x08,
}

/// A decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: u8,
    pub stream: i16,
    pub opcode: u8,
    pub length: usize,
}

impl FrameHeader {
    /// Parses a response header.
    pub fn parse(raw: &[u8; HEADER_LEN]) -> Result<Self> {
        let mut buf = &raw[..];
        let version = buf.get_u8();
        let flags = buf.get_u8();
        let stream = buf.get_i16();
        let opcode = buf.get_u8();
        let length = buf.get_u32() as usize;

        if version != (PROTOCOL_VERSION | RESPONSE_BIT) {
            return Err(CqlError::protocol(format!(
                "unsupported response version 0x{version:02x}"
            )));
        }
        if flags & FLAG_COMPRESSION != 0 {
            return Err(CqlError::protocol("compressed frame received"));
        }
        if length > MAX_BODY_LEN {
            return Err(CqlError::protocol(format!(
                "frame body of {length} bytes exceeds limit"
            )));
        }

        Ok(Self {
            flags,
            stream,
            opcode,
            length,
        })
    }
}

/// A decoded server response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ready,
    Authenticate(String),
    Error { code: u32, message: String },
    Result(ResultSet),
}

/// Builds a STARTUP request.
pub fn encode_startup(stream: i16) -> BytesMut {
    let mut body = BytesMut::new();
    body.put_u16(1);
    put_string(&mut body, "CQL_VERSION");
    put_string(&mut body, CQL_VERSION);
    encode_frame(stream, Opcode::Startup, &body)
}

/// Builds a QUERY request with no bound values and no paging.
pub fn encode_query(stream: i16, query: &str, consistency: Consistency) -> BytesMut {
    let mut body = BytesMut::with_capacity(query.len() + 7);
    body.put_i32(query.len() as i32);
    body.put_slice(query.as_bytes());
    body.put_u16(consistency.code());
    body.put_u8(0);
    encode_frame(stream, Opcode::Query, &body)
}

fn encode_frame(stream: i16, opcode: Opcode, body: &[u8]) -> BytesMut {
    let mut frame = BytesMut::with_capacity(HEADER_LEN + body.len());
    frame.put_u8(PROTOCOL_VERSION);
    frame.put_u8(0);
    frame.put_i16(stream);
    frame.put_u8(opcode as u8);
    frame.put_u32(body.len() as u32);
    frame.put_slice(body);
    frame
}

fn put_string(buf: &mut BytesMut, s: &str) {
    buf.put_u16(s.len() as u16);
    buf.put_slice(s.as_bytes());
}

/// Decodes a response body.
pub fn decode_response(header: &FrameHeader, mut body: Bytes) -> Result<Response> {
    skip_envelope(header.flags, &mut body)?;

    match header.opcode {
        op if op == Opcode::Ready as u8 => Ok(Response::Ready),
        op if op == Opcode::Authenticate as u8 => {
            Ok(Response::Authenticate(read_string(&mut body)?))
        }
        op if op == Opcode::Error as u8 => {
            let code = read_i32(&mut body)? as u32;
            let message = read_string(&mut body)?;
            Ok(Response::Error { code, message })
        }
        op if op == Opcode::Result as u8 => decode_result(&mut body).map(Response::Result),
        other => Err(CqlError::protocol(format!(
            "unexpected response opcode 0x{other:02x}"
        ))),
    }
}

/// Skips the tracing id, warnings and custom payload that may precede a body.
fn skip_envelope(flags: u8, body: &mut Bytes) -> Result<()> {
    if flags & FLAG_TRACING != 0 {
        need(body, 16)?;
        body.advance(16);
    }
    if flags & FLAG_WARNING != 0 {
        for warning in read_string_list(body)? {
            warn!("Server warning: {}", warning);
        }
    }
    if flags & FLAG_CUSTOM_PAYLOAD != 0 {
        let entries = read_u16(body)?;
        for _ in 0..entries {
            read_string(body)?;
            read_bytes(body)?;
        }
    }
    Ok(())
}

fn decode_result(body: &mut Bytes) -> Result<ResultSet> {
    let kind = read_i32(body)?;
    match kind {
        0x0001 => Ok(ResultSet::Void),
        0x0002 => decode_rows(body),
        0x0003 => Ok(ResultSet::SetKeyspace {
            name: read_string(body)?,
        }),
        0x0005 => decode_schema_change(body),
        other => Err(CqlError::protocol(format!(
            "unsupported result kind 0x{other:04x}"
        ))),
    }
}

fn decode_rows(body: &mut Bytes) -> Result<ResultSet> {
    let flags = read_i32(body)?;
    let column_count = read_count(body)?;

    if flags & ROWS_HAS_MORE_PAGES != 0 {
        read_bytes(body)?;
        debug!("Server reported more pages; only the first is shown");
    }
    if flags & ROWS_NO_METADATA != 0 {
        return Err(CqlError::protocol("rows result without column metadata"));
    }

    let global_spec = flags & ROWS_GLOBAL_TABLES_SPEC != 0;
    if global_spec {
        read_string(body)?;
        read_string(body)?;
    }

    // Every column spec and every cell takes at least four bytes.
    let mut metadata = Vec::with_capacity(column_count.min(body.remaining() / 4));
    for _ in 0..column_count {
        if !global_spec {
            read_string(body)?;
            read_string(body)?;
        }
        let name = read_string(body)?;
        let column_type = read_type(body, 0)?;
        metadata.push(ColumnSpec { name, column_type });
    }

    let row_count = read_count(body)?;
    if column_count == 0 && row_count > 0 {
        return Err(CqlError::protocol(format!(
            "{row_count} rows reported without columns"
        )));
    }
    let mut rows: Vec<Row> = Vec::with_capacity(row_count.min(1024));
    for _ in 0..row_count {
        let mut row = Vec::with_capacity(column_count.min(body.remaining() / 4));
        for column in &metadata {
            let value = read_bytes(body)?;
            row.push(decode_value(value, column.column_type));
        }
        rows.push(row);
    }

    Ok(ResultSet::Rows { metadata, rows })
}

fn decode_schema_change(body: &mut Bytes) -> Result<ResultSet> {
    let change = read_string(body)?;
    let target = read_string(body)?;
    let keyspace = read_string(body)?;
    let table = match target.as_str() {
        "KEYSPACE" => String::new(),
        "TABLE" | "TYPE" => read_string(body)?,
        "FUNCTION" | "AGGREGATE" => {
            let name = read_string(body)?;
            let args = read_string_list(body)?;
            format!("{name}({})", args.join(", "))
        }
        other => {
            return Err(CqlError::protocol(format!(
                "unknown schema change target {other}"
            )))
        }
    };
    Ok(ResultSet::SchemaChange {
        change,
        keyspace,
        table,
    })
}

fn decode_value(value: Option<Bytes>, column_type: ColumnType) -> ColumnValue {
    let Some(bytes) = value else {
        return ColumnValue::Null;
    };
    match column_type {
        ColumnType::Int => match <[u8; 4]>::try_from(&bytes[..]) {
            Ok(raw) => ColumnValue::Int(i32::from_be_bytes(raw)),
            Err(_) => ColumnValue::Bytes(bytes.to_vec()),
        },
        ColumnType::Text | ColumnType::Varchar => {
            ColumnValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        ColumnType::Other(_) => ColumnValue::Bytes(bytes.to_vec()),
    }
}

/// Reads a type option, consuming any nested type descriptions.
fn read_type(body: &mut Bytes, depth: usize) -> Result<ColumnType> {
    if depth > MAX_TYPE_DEPTH {
        return Err(CqlError::protocol(format!(
            "column type nested deeper than {MAX_TYPE_DEPTH} levels"
        )));
    }
    let id = read_u16(body)?;
    match id {
        // custom: class name
        0x0000 => {
            read_string(body)?;
        }
        // list, set
        0x0020 | 0x0022 => {
            read_type(body, depth + 1)?;
        }
        // map
        0x0021 => {
            read_type(body, depth + 1)?;
            read_type(body, depth + 1)?;
        }
        // udt
        0x0030 => {
            read_string(body)?;
            read_string(body)?;
            for _ in 0..read_u16(body)? {
                read_string(body)?;
                read_type(body, depth + 1)?;
            }
        }
        // tuple
        0x0031 => {
            for _ in 0..read_u16(body)? {
                read_type(body, depth + 1)?;
            }
        }
        _ => {}
    }

    Ok(match id {
        0x0001 | 0x000A => ColumnType::Text,
        0x000D => ColumnType::Varchar,
        0x0009 => ColumnType::Int,
        other => ColumnType::Other(other),
    })
}

fn need(body: &Bytes, n: usize) -> Result<()> {
    if body.remaining() < n {
        return Err(CqlError::protocol(format!(
            "truncated frame body: needed {n} bytes, {} left",
            body.remaining()
        )));
    }
    Ok(())
}

fn read_u16(body: &mut Bytes) -> Result<u16> {
    need(body, 2)?;
    Ok(body.get_u16())
}

fn read_i32(body: &mut Bytes) -> Result<i32> {
    need(body, 4)?;
    Ok(body.get_i32())
}

fn read_count(body: &mut Bytes) -> Result<usize> {
    let n = read_i32(body)?;
    usize::try_from(n).map_err(|_| CqlError::protocol(format!("negative count {n}")))
}

fn read_string(body: &mut Bytes) -> Result<String> {
    let len = read_u16(body)? as usize;
    need(body, len)?;
    let raw = body.split_to(len);
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn read_string_list(body: &mut Bytes) -> Result<Vec<String>> {
    let n = read_u16(body)?;
    (0..n).map(|_| read_string(body)).collect()
}

/// Reads a `[bytes]` value; a negative length means null.
fn read_bytes(body: &mut Bytes) -> Result<Option<Bytes>> {
    let len = read_i32(body)?;
    if len < 0 {
        return Ok(None);
    }
    let len = len as usize;
    need(body, len)?;
    Ok(Some(body.split_to(len)))
}
