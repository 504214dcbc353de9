/*!
# Tests for Offset and Value Window Functions

Covers LAG and LEAD (offsets, defaults, frame independence) and
FIRST_VALUE, LAST_VALUE, NTH_VALUE (frame-bound value selection,
including the default-frame LAST_VALUE behavior).
*/

use rowpane::{
    Column, ColumnType, FieldValue, FrameBound, FrameSpec, FunctionArg, FunctionCall, OrderKey,
    Row, Schema, WindowEvaluator, WindowRequest, WindowSpec,
};
use std::collections::HashMap;

fn create_test_row(seq: i64, price: i64) -> Row {
    let mut fields = HashMap::new();
    fields.insert("seq".to_string(), FieldValue::Integer(seq));
    fields.insert("price".to_string(), FieldValue::Integer(price));
    Row::new(fields)
}

fn test_schema() -> Schema {
    Schema::new(vec![
        Column::new("seq", ColumnType::Integer),
        Column::new("price", ColumnType::Integer),
    ])
}

fn column(result: &[Row], name: &str) -> Vec<FieldValue> {
    result.iter().map(|r| r.column(name)).collect()
}

fn ints(values: &[i64]) -> Vec<FieldValue> {
    values.iter().map(|&v| FieldValue::Integer(v)).collect()
}

#[test]
fn test_lag_and_lead_shift_by_one() {
    let rows = vec![
        create_test_row(1, 100),
        create_test_row(2, 105),
        create_test_row(3, 98),
        create_test_row(4, 110),
    ];
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("seq")]),
        vec![
            FunctionCall::on_column("lag", "price", "prev_price"),
            FunctionCall::on_column("lead", "price", "next_price"),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(
        column(&result, "prev_price"),
        vec![
            FieldValue::Null,
            FieldValue::Integer(100),
            FieldValue::Integer(105),
            FieldValue::Integer(98),
        ]
    );
    assert_eq!(
        column(&result, "next_price"),
        vec![
            FieldValue::Integer(105),
            FieldValue::Integer(98),
            FieldValue::Integer(110),
            FieldValue::Null,
        ]
    );
}

#[test]
fn test_lag_with_offset_and_default() {
    let rows = vec![
        create_test_row(1, 10),
        create_test_row(2, 20),
        create_test_row(3, 30),
    ];
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("seq")]),
        vec![FunctionCall::new(
            "lag",
            vec![
                FunctionArg::Column("price".to_string()),
                FunctionArg::Literal(FieldValue::Integer(2)),
                FunctionArg::Literal(FieldValue::Integer(-1)),
            ],
            "lag2",
        )],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    // The default fills every position the offset cannot reach
    assert_eq!(column(&result, "lag2"), ints(&[-1, -1, 10]));
}

#[test]
fn test_lag_zero_offset_returns_current_value() {
    let rows = vec![create_test_row(1, 7), create_test_row(2, 8)];
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("seq")]),
        vec![FunctionCall::new(
            "lag",
            vec![
                FunctionArg::Column("price".to_string()),
                FunctionArg::Literal(FieldValue::Integer(0)),
            ],
            "same",
        )],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(column(&result, "same"), ints(&[7, 8]));
}

#[test]
fn test_offsets_ignore_the_frame() {
    let rows = vec![
        create_test_row(1, 10),
        create_test_row(2, 20),
        create_test_row(3, 30),
        create_test_row(4, 40),
    ];
    // A one-row frame must not limit what LAG and LEAD can see
    let requests = vec![WindowRequest::new(
        WindowSpec::new()
            .order_by(vec![OrderKey::asc("seq")])
            .with_frame(FrameSpec::rows(FrameBound::CurrentRow, FrameBound::CurrentRow)),
        vec![
            FunctionCall::new(
                "lag",
                vec![
                    FunctionArg::Column("price".to_string()),
                    FunctionArg::Literal(FieldValue::Integer(3)),
                ],
                "lag3",
            ),
            FunctionCall::on_column("lead", "price", "next"),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(
        column(&result, "lag3"),
        vec![
            FieldValue::Null,
            FieldValue::Null,
            FieldValue::Null,
            FieldValue::Integer(10),
        ]
    );
    assert_eq!(
        column(&result, "next"),
        vec![
            FieldValue::Integer(20),
            FieldValue::Integer(30),
            FieldValue::Integer(40),
            FieldValue::Null,
        ]
    );
}

#[test]
fn test_lag_and_lead_are_inverse_shifts() {
    let rows: Vec<Row> = (1..=6).map(|i| create_test_row(i, i * 11)).collect();
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("seq")]),
        vec![
            FunctionCall::no_args("row_number", "rn"),
            FunctionCall::on_column("lag", "price", "prev"),
            FunctionCall::on_column("lead", "price", "next"),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    let mut ordered: Vec<&Row> = result.iter().collect();
    ordered.sort_by_key(|r| match r.column("rn") {
        FieldValue::Integer(i) => i,
        other => panic!("expected integer row number, got {:?}", other),
    });

    for pair in ordered.windows(2) {
        assert_eq!(
            pair[1].column("prev"),
            pair[0].column("price"),
            "lag at i+1 must equal the value at i"
        );
        assert_eq!(
            pair[0].column("next"),
            pair[1].column("price"),
            "lead at i must equal the value at i+1"
        );
    }
}

#[test]
fn test_lag_respects_partitions() {
    let mut rows = Vec::new();
    for (group, seq, price) in [("a", 1, 10), ("b", 1, 100), ("a", 2, 20), ("b", 2, 200)] {
        let mut fields = HashMap::new();
        fields.insert("grp".to_string(), FieldValue::String(group.to_string()));
        fields.insert("seq".to_string(), FieldValue::Integer(seq));
        fields.insert("price".to_string(), FieldValue::Integer(price));
        rows.push(Row::new(fields));
    }
    let schema = Schema::new(vec![
        Column::new("grp", ColumnType::String),
        Column::new("seq", ColumnType::Integer),
        Column::new("price", ColumnType::Integer),
    ]);

    let requests = vec![WindowRequest::new(
        WindowSpec::new()
            .partition_by(vec!["grp"])
            .order_by(vec![OrderKey::asc("seq")]),
        vec![FunctionCall::on_column("lag", "price", "prev")],
    )];

    let result = WindowEvaluator::evaluate(&rows, &schema, &requests).unwrap();
    // First row of each partition has no predecessor
    assert_eq!(result[0].column("prev"), FieldValue::Null);
    assert_eq!(result[1].column("prev"), FieldValue::Null);
    assert_eq!(result[2].column("prev"), FieldValue::Integer(10));
    assert_eq!(result[3].column("prev"), FieldValue::Integer(100));
}

#[test]
fn test_first_and_last_value_under_default_frame() {
    let rows = vec![
        create_test_row(1, 30),
        create_test_row(2, 10),
        create_test_row(3, 20),
    ];
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("price")]),
        vec![
            FunctionCall::on_column("first_value", "price", "lowest"),
            FunctionCall::on_column("last_value", "price", "frame_end"),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    // FIRST_VALUE always sees the partition start under the default frame
    assert_eq!(column(&result, "lowest"), ints(&[10, 10, 10]));
    // LAST_VALUE under the default frame stops at the current peer group,
    // so each distinct value sees itself
    assert_eq!(column(&result, "frame_end"), ints(&[30, 10, 20]));
}

#[test]
fn test_last_value_with_full_frame_sees_partition_end() {
    let rows = vec![
        create_test_row(1, 30),
        create_test_row(2, 10),
        create_test_row(3, 20),
    ];
    let requests = vec![WindowRequest::new(
        WindowSpec::new()
            .order_by(vec![OrderKey::asc("price")])
            .with_frame(FrameSpec::rows(
                FrameBound::UnboundedPreceding,
                FrameBound::UnboundedFollowing,
            )),
        vec![FunctionCall::on_column("last_value", "price", "highest")],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(column(&result, "highest"), ints(&[30, 30, 30]));
}

#[test]
fn test_last_value_default_frame_includes_whole_peer_group() {
    // Peers extend the default frame to the group end, so tied rows see the
    // group's last row, not themselves
    let rows = vec![create_test_row(1, 10), create_test_row(2, 10)];
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("price")]),
        vec![
            FunctionCall::no_args("count", "frame_rows"),
            FunctionCall::on_column("last_value", "seq", "group_last_seq"),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(column(&result, "frame_rows"), ints(&[2, 2]));

    // Both rows report the same frame-final seq; which of the tied rows
    // sorts last is unspecified
    let last = result[0].column("group_last_seq");
    assert_eq!(result[1].column("group_last_seq"), last);
    assert!(last == FieldValue::Integer(1) || last == FieldValue::Integer(2));
}

#[test]
fn test_nth_value_inside_and_outside_frame() {
    let rows = vec![
        create_test_row(1, 10),
        create_test_row(2, 20),
        create_test_row(3, 30),
    ];
    let requests = vec![WindowRequest::new(
        WindowSpec::new()
            .order_by(vec![OrderKey::asc("price")])
            .with_frame(FrameSpec::rows(
                FrameBound::UnboundedPreceding,
                FrameBound::UnboundedFollowing,
            )),
        vec![
            FunctionCall::new(
                "nth_value",
                vec![
                    FunctionArg::Column("price".to_string()),
                    FunctionArg::Literal(FieldValue::Integer(2)),
                ],
                "second",
            ),
            FunctionCall::new(
                "nth_value",
                vec![
                    FunctionArg::Column("price".to_string()),
                    FunctionArg::Literal(FieldValue::Integer(9)),
                ],
                "ninth",
            ),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(column(&result, "second"), ints(&[20, 20, 20]));
    assert_eq!(
        column(&result, "ninth"),
        vec![FieldValue::Null, FieldValue::Null, FieldValue::Null],
        "positions past the frame end are NULL"
    );
}

#[test]
fn test_nth_value_first_position_matches_first_value() {
    let rows = vec![create_test_row(1, 5), create_test_row(2, 15)];
    let requests = vec![WindowRequest::new(
        WindowSpec::new().order_by(vec![OrderKey::asc("price")]),
        vec![
            FunctionCall::on_column("first_value", "price", "first"),
            FunctionCall::new(
                "nth_value",
                vec![
                    FunctionArg::Column("price".to_string()),
                    FunctionArg::Literal(FieldValue::Integer(1)),
                ],
                "nth1",
            ),
        ],
    )];

    let result = WindowEvaluator::evaluate(&rows, &test_schema(), &requests).unwrap();
    assert_eq!(column(&result, "first"), column(&result, "nth1"));
}
