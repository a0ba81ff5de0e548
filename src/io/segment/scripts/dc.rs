//! Document-construction (DC) records: sketches, constraints, dimensions,
//! parameters and features.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::{Custom, Script};
use super::{
    after, before, build_table, child, cross, field, list, Field, HandlerTable, CONSTRAINT_2D,
    CONSTRAINT_3D, CONTENT, HEADER0, NAME,
};
use crate::error::Result;
use crate::io::segment::record_reader::{ElementKind, RecordReader};
use crate::model::node::Node;
use crate::model::node_ref::RefKind;
use crate::model::value::{ListShape, ListValue, Value};

// ---------------------------------------------------------------------------
// Sketches and sketch entities
// ---------------------------------------------------------------------------

const SKETCH_2D: &[Field] = &[
    CONTENT,
    NAME,
    field("transformation", CodedFloat),
    list("entities", ElementKind::ChildRef),
    after(2012, "dimensions", List(ElementKind::CrossRef)),
];

const POINT_2D: &[Field] = &[
    CONTENT,
    cross("sketch"),
    field("x", F64),
    field("y", F64),
    list("entities", ElementKind::CrossRef),
];

const LINE_2D: &[Field] = &[
    CONTENT,
    cross("sketch"),
    list("points", ElementKind::CrossRef),
    after(2011, "construction", Bool),
];

const CIRCLE_2D: &[Field] = &[
    CONTENT,
    cross("sketch"),
    cross("center"),
    field("r", F64),
    field("startAngle", F64),
    field("sweepAngle", F64),
];

const ELLIPSE_2D: &[Field] = &[
    CONTENT,
    cross("sketch"),
    cross("center"),
    field("majorAxis", F64Array(2)),
    field("a", F64),
    field("b", F64),
    after(2013, "startAngle", F64),
    after(2013, "sweepAngle", F64),
];

const SPLINE_2D: &[Field] = &[
    CONTENT,
    cross("sketch"),
    list("points", ElementKind::CrossRef),
    list("knots", ElementKind::F64),
    list("poles", ElementKind::F64x2),
    field("degree", U16),
];

const SKETCH_3D: &[Field] = &[
    CONTENT,
    NAME,
    list("entities", ElementKind::ChildRef),
];

const POINT_3D: &[Field] = &[
    CONTENT,
    cross("sketch3D"),
    field("position", F64Array(3)),
    list("entities", ElementKind::CrossRef),
];

const LINE_3D: &[Field] = &[
    CONTENT,
    cross("sketch3D"),
    list("points", ElementKind::CrossRef),
];

const CIRCLE_3D: &[Field] = &[
    CONTENT,
    cross("sketch3D"),
    cross("center"),
    field("normal", F64Array(3)),
    field("r", F64),
];

const ELLIPSE_3D: &[Field] = &[
    CONTENT,
    cross("sketch3D"),
    cross("center"),
    field("normal", F64Array(3)),
    field("majorAxis", F64Array(3)),
    field("a", F64),
    field("b", F64),
];

// ---------------------------------------------------------------------------
// Geometric constraints
// ---------------------------------------------------------------------------

const CONSTRAINT_PAIR_2D: &[Field] = &[CONSTRAINT_2D, cross("entity1"), cross("entity2")];

const CONSTRAINT_SINGLE_2D: &[Field] = &[CONSTRAINT_2D, cross("entity")];

const CONSTRAINT_SYMMETRY_2D: &[Field] = &[
    CONSTRAINT_2D,
    cross("entity1"),
    cross("entity2"),
    cross("symmetryLine"),
];

const CONSTRAINT_PAIR_3D: &[Field] = &[CONSTRAINT_3D, cross("entity1"), cross("entity2")];

const CONSTRAINT_SINGLE_3D: &[Field] = &[CONSTRAINT_3D, cross("entity")];

const RADIUS_2D: &[Field] = &[
    CONTENT,
    cross("sketch"),
    cross("entity"),
    field("value", F64),
];

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

const DIMENSION_PAIR: &[Field] = &[
    CONSTRAINT_2D,
    cross("parameter"),
    cross("entity1"),
    cross("entity2"),
    after(2014, "anchor", F64Array(2)),
];

const DIMENSION_ANGLE: &[Field] = &[
    CONSTRAINT_2D,
    cross("parameter"),
    cross("line1"),
    cross("line2"),
    field("quadrant", U8),
    after(2014, "anchor", F64Array(2)),
];

const DIMENSION_CURVE: &[Field] = &[
    CONSTRAINT_2D,
    cross("parameter"),
    cross("entity"),
    after(2014, "anchor", F64Array(2)),
];

// ---------------------------------------------------------------------------
// Parameters and expression nodes
// ---------------------------------------------------------------------------

const PARAMETER: &[Field] = &[
    CONTENT,
    NAME,
    child("refValue"),
    cross("unit"),
    field("value", F64),
    after(2012, "comment", Text16),
    after(2015, "exported", Bool),
];

const PARAMETER_VALUE: &[Field] = &[
    HEADER0,
    field("value", F64),
    field("type", U16),
    cross("unit"),
];

const PARAMETER_UNIT: &[Field] = &[
    HEADER0,
    field("symbol", Name),
    field("factor", F64),
    field("offset", F64),
];

const PARAMETER_UNARY_MINUS: &[Field] = &[HEADER0, child("value"), cross("unit")];

const PARAMETER_CONSTANT: &[Field] = &[
    HEADER0,
    NAME,
    field("value", F64),
    cross("unit"),
];

const PARAMETER_REF: &[Field] = &[HEADER0, cross("target"), cross("unit")];

const PARAMETER_OPERATION: &[Field] = &[
    HEADER0,
    child("operand1"),
    child("operand2"),
    cross("unit"),
];

const PARAMETER_COMMENT: &[Field] = &[HEADER0, cross("parameter"), field("comment", Text16)];

/// `ParameterFunction`: the operand count is stored in the record.
fn read_parameter_function(r: &mut RecordReader<'_>, node: &mut Node) -> Result<()> {
    r.header0(node)?;
    let code = r.cursor().read_u16()?;
    r.bind(node, "code", Value::U16(code))?;
    r.skip_block_size(2)?;
    let count = r.cursor().read_u32()?;
    let mut operands = Vec::with_capacity(count.min(16) as usize);
    for position in 0..count {
        let operand = r.read_node_ref(RefKind::Child)?.with_number(position);
        operands.push(Value::Ref(operand));
    }
    r.bind(
        node,
        "operands",
        Value::List(ListValue {
            shape: ListShape::Sequence,
            items: operands,
        }),
    )?;
    let unit = r.read_node_ref(RefKind::Cross)?;
    r.bind(node, "unit", Value::Ref(unit))
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

const VALUE_BYTE: &[Field] = &[HEADER0, field("value", U8)];
const VALUE_SINT32: &[Field] = &[HEADER0, field("value", I32)];
const VALUE_UINT32: &[Field] = &[HEADER0, field("value", U32)];
const VALUE_DOUBLE: &[Field] = &[HEADER0, field("value", F64)];

// ---------------------------------------------------------------------------
// Features and work geometry
// ---------------------------------------------------------------------------

const FEATURE: &[Field] = &[
    CONTENT,
    NAME,
    list("properties", ElementKind::CrossRef),
    cross("body"),
    after(2013, "healthState", U32),
    before(2011, "legacyFlags", U16),
];

const FEATURE_OPERATION: &[Field] = &[HEADER0, NAME, field("operation", U32)];

const PROFILE_SELECTION: &[Field] = &[
    HEADER0,
    cross("sketch"),
    list("entities", ElementKind::CrossRef),
];

const EXTENT_DISTANCE: &[Field] = &[
    HEADER0,
    cross("parameter"),
    field("direction", U8),
    after(2016, "symmetric", Bool),
];

const EXTENT_ANGLE: &[Field] = &[HEADER0, cross("parameter"), cross("axis")];

const SOLID_BODY: &[Field] = &[
    CONTENT,
    NAME,
    list("features", ElementKind::CrossRef),
    after(2017, "visible", Bool),
];

const WORK_PLANE: &[Field] = &[CONTENT, NAME, field("transformation", CodedFloat)];

const WORK_AXIS: &[Field] = &[
    CONTENT,
    NAME,
    field("origin", F64Array(3)),
    field("direction", F64Array(3)),
];

const WORK_POINT: &[Field] = &[CONTENT, NAME, field("position", F64Array(3))];

const DOCUMENT_ROOT: &[Field] = &[
    HEADER0,
    list("parameters", ElementKind::ChildRef),
    list("sketches", ElementKind::ChildRef),
    list("features", ElementKind::ChildRef),
    list("bodies", ElementKind::ChildRef),
    after(2018, "workGeometry", List(ElementKind::ChildRef)),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x4E951290, "DocumentRoot", Script(DOCUMENT_ROOT)),
        // sketches
        (0x90874D51, "Sketch2D", Script(SKETCH_2D)),
        (0x8F0B160C, "Point2D", Script(POINT_2D)),
        (0x8EF06C89, "Line2D", Script(LINE_2D)),
        (0x8F0B160B, "Circle2D", Script(CIRCLE_2D)),
        (0xFF084E0F, "Ellipse2D", Script(ELLIPSE_2D)),
        (0x8FEC335F, "Spline2D", Script(SPLINE_2D)),
        (0x0D74EA4E, "Sketch3D", Script(SKETCH_3D)),
        (0x2E04A208, "Point3D", Script(POINT_3D)),
        (0x6A4F7B1F, "Line3D", Script(LINE_3D)),
        (0x3FF1AE2D, "Circle3D", Script(CIRCLE_3D)),
        (0x4A156F24, "Ellipse3D", Script(ELLIPSE_3D)),
        // constraints
        (0x8C1B6B3A, "Geometric_Coincident2D", Script(CONSTRAINT_PAIR_2D)),
        (0x73F7E3D6, "Geometric_Parallel2D", Script(CONSTRAINT_PAIR_2D)),
        (0xD00F9E6E, "Geometric_Perpendicular2D", Script(CONSTRAINT_PAIR_2D)),
        (0x5D0B89FE, "Geometric_Tangential2D", Script(CONSTRAINT_PAIR_2D)),
        (0x1E4E1D6C, "Geometric_Equal2D", Script(CONSTRAINT_PAIR_2D)),
        (0x8E2A3E55, "Geometric_Collinear2D", Script(CONSTRAINT_PAIR_2D)),
        (0x10B6ADEF, "Geometric_Horizontal2D", Script(CONSTRAINT_SINGLE_2D)),
        (0x3AA0C3C4, "Geometric_Vertical2D", Script(CONSTRAINT_SINGLE_2D)),
        (0x671D9A8E, "Geometric_Fix2D", Script(CONSTRAINT_SINGLE_2D)),
        (0x4B57DC56, "Geometric_Symmetry2D", Script(CONSTRAINT_SYMMETRY_2D)),
        (0x9E43716A, "Geometric_Coincident3D", Script(CONSTRAINT_PAIR_3D)),
        (0x3BA63938, "Geometric_Parallel3D", Script(CONSTRAINT_PAIR_3D)),
        (0x5F1F9B47, "Geometric_Perpendicular3D", Script(CONSTRAINT_PAIR_3D)),
        (0x7A1BF0A6, "Geometric_Fix3D", Script(CONSTRAINT_SINGLE_3D)),
        (0x8D3A6F25, "Radius2D", Script(RADIUS_2D)),
        // dimensions
        (0xEF1E3BE5, "Dimension_Distance2D", Script(DIMENSION_PAIR)),
        (0x3683FF40, "Dimension_Distance_Horizontal2D", Script(DIMENSION_PAIR)),
        (0xC173A073, "Dimension_Distance_Vertical2D", Script(DIMENSION_PAIR)),
        (0x5CB011E2, "Dimension_Angle2D", Script(DIMENSION_ANGLE)),
        (0x0C48E6A3, "Dimension_Radius2D", Script(DIMENSION_CURVE)),
        (0xEB7A3D2C, "Dimension_Diameter2D", Script(DIMENSION_CURVE)),
        // parameters
        (0xCE52DF3A, "Parameter", Script(PARAMETER)),
        (0xCE52DF3E, "ParameterValue", Script(PARAMETER_VALUE)),
        (0xF8A779F8, "ParameterUnit", Script(PARAMETER_UNIT)),
        (0xCE52DF40, "ParameterUnaryMinus", Script(PARAMETER_UNARY_MINUS)),
        (0xCE52DF35, "ParameterConstant", Script(PARAMETER_CONSTANT)),
        (0xCE52DF3B, "ParameterRef", Script(PARAMETER_REF)),
        (0xCE52DF3C, "ParameterFunction", Custom(read_parameter_function)),
        (0xCE52DF42, "ParameterOperationPlus", Script(PARAMETER_OPERATION)),
        (0xCE52DF43, "ParameterOperationMinus", Script(PARAMETER_OPERATION)),
        (0xCE52DF44, "ParameterOperationMul", Script(PARAMETER_OPERATION)),
        (0xCE52DF45, "ParameterOperationDiv", Script(PARAMETER_OPERATION)),
        (0xCE52DF46, "ParameterOperationModulo", Script(PARAMETER_OPERATION)),
        (0xCE52DF47, "ParameterOperationPower", Script(PARAMETER_OPERATION)),
        (0xCE52DF48, "ParameterOperationPowerIdent", Script(PARAMETER_OPERATION)),
        (0x9C8C5A1B, "ParameterComment", Script(PARAMETER_COMMENT)),
        // values
        (0x0AE12F04, "ValueByte", Script(VALUE_BYTE)),
        (0x0AE12F05, "ValueSInt32", Script(VALUE_SINT32)),
        (0x0AE12F06, "ValueUInt32", Script(VALUE_UINT32)),
        (0x0AE12F07, "ValueDouble", Script(VALUE_DOUBLE)),
        // features
        (0xA5977BAA, "FxExtrusion", Script(FEATURE)),
        (0x55180B1B, "FxRevolution", Script(FEATURE)),
        (0xBB1D9E5F, "FxFillet", Script(FEATURE)),
        (0xF90D0F54, "FxChamfer", Script(FEATURE)),
        (0x4688EBA3, "FxHole", Script(FEATURE)),
        (0x6CA92D02, "FxMirror", Script(FEATURE)),
        (0x7DAA0032, "FxPatternRectangular", Script(FEATURE)),
        (0x2D06CAD3, "FxPatternPolar", Script(FEATURE)),
        (0x3E710428, "FxShell", Script(FEATURE)),
        (0x0E6B7F33, "FeatureOperation", Script(FEATURE_OPERATION)),
        (0x4CF2C6A5, "ProfileSelection", Script(PROFILE_SELECTION)),
        (0xA4645884, "ExtentDistance", Script(EXTENT_DISTANCE)),
        (0x27D13A6C, "ExtentAngle", Script(EXTENT_ANGLE)),
        (0x5DA9F6AE, "SolidBody", Script(SOLID_BODY)),
        (0x2B241309, "WorkPlane", Script(WORK_PLANE)),
        (0x2B24130A, "WorkAxis", Script(WORK_AXIS)),
        (0x2B24130B, "WorkPoint", Script(WORK_POINT)),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FormatVersion, TypeId};

    #[test]
    fn test_parameter_function_operands() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0x18u16.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[3, 0, 0, 0, 4, 0, 0, 0]);
        data.extend_from_slice(&[9, 0, 0, 0]);
        let mut node = Node::new(2, TypeId::NIL, 0, data.clone());
        let mut r = RecordReader::new(&data, 0, FormatVersion::V2012, true);
        TABLE[&0xCE52DF3C].run(&mut r, &mut node).unwrap();
        assert!(r.take_residual().is_none());
        let operands = node.attributes.get_list("operands").unwrap();
        assert_eq!(operands.items.len(), 2);
        assert_eq!(
            operands.items[1].as_node_ref().map(|n| (n.index(), n.number)),
            Some((4, Some(1)))
        );
        assert_eq!(node.attributes.get_ref("unit").map(|n| n.index()), Some(9));
    }

    #[test]
    fn test_dimension_names() {
        let names: Vec<_> = TABLE
            .values()
            .map(|h| h.type_name)
            .filter(|n| n.starts_with("Dimension_"))
            .collect();
        assert_eq!(names.len(), 6);
    }
}
