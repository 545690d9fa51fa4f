//! Rendering tests through the public API.

use cqlpipe::db::{ColumnSpec, ColumnType, ColumnValue, ResultSet};
use cqlpipe::output::{render, render_to_string, RenderError, NULL_MARKER};
use pretty_assertions::assert_eq;

fn mixed_result() -> ResultSet {
    ResultSet::rows(
        vec![
            ColumnSpec::new("id", ColumnType::Int),
            ColumnSpec::new("name", ColumnType::Text),
            ColumnSpec::new("email", ColumnType::Varchar),
            ColumnSpec::new("avatar", ColumnType::Other(0x0003)),
        ],
        vec![
            vec![
                ColumnValue::Int(1),
                ColumnValue::from("alice"),
                ColumnValue::from("alice@example.com"),
                ColumnValue::Bytes(vec![0x01, 0xAB, 0x00]),
            ],
            vec![
                ColumnValue::Int(-20),
                ColumnValue::Null,
                ColumnValue::Text(String::new()),
                ColumnValue::Bytes(Vec::new()),
            ],
        ],
    )
}

#[test]
fn test_mixed_types_table() {
    let output = render_to_string(&mixed_result()).unwrap();
    assert_eq!(
        output,
        "+-----+-------+-------------------+----------+\n\
         | id  | name  | email             | avatar   |\n\
         +-----+-------+-------------------+----------+\n\
         | 1   | alice | alice@example.com | 0x01ab00 |\n\
         | -20 | NULL  |                   | 0x       |\n\
         +-----+-------+-------------------+----------+\n\
         Query returned 2 rows\n"
    );
}

#[test]
fn test_null_and_empty_text_differ() {
    let output = render_to_string(&mixed_result()).unwrap();
    let row = output.lines().nth(4).unwrap();
    let cells: Vec<&str> = row.split('|').map(str::trim).collect();
    assert_eq!(cells[2], NULL_MARKER);
    assert_eq!(cells[3], "");
}

#[test]
fn test_render_twice_is_identical() {
    let result = mixed_result();
    let mut first: Vec<u8> = Vec::new();
    let mut second: Vec<u8> = Vec::new();
    render(&result, &mut first).unwrap();
    render(&result, &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_all_lines_share_one_width() {
    let mut rows: Vec<Vec<ColumnValue>> = (0..50)
        .map(|i| vec![ColumnValue::Int(i), ColumnValue::from("x")])
        .collect();
    rows.push(vec![
        ColumnValue::Int(i32::MAX),
        ColumnValue::from("the widest value, last"),
    ]);
    let result = ResultSet::rows(
        vec![
            ColumnSpec::new("n", ColumnType::Int),
            ColumnSpec::new("v", ColumnType::Text),
        ],
        rows,
    );

    let output = render_to_string(&result).unwrap();
    let table: Vec<&str> = output.lines().filter(|l| !l.starts_with("Query")).collect();
    let width = table[0].len();

    assert_eq!(table.len(), 55);
    assert!(table.iter().all(|line| line.len() == width));
    assert!(output.ends_with("Query returned 51 rows\n"));
}

#[test]
fn test_shape_violation_is_an_error() {
    let result = ResultSet::rows(
        vec![ColumnSpec::new("id", ColumnType::Int)],
        vec![vec![ColumnValue::Int(1), ColumnValue::Int(2)]],
    );
    let err = render_to_string(&result).unwrap_err();
    assert!(matches!(err, RenderError::RowShape { expected: 1, actual: 2, .. }));
}
