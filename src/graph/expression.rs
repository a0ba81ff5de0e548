//! Parameter expression rendering.
//!
//! A `Parameter` node owns an expression tree through its `refValue` child:
//! literals (`ParameterValue`), references to other parameters
//! (`ParameterRef`), named constants, unary minus, binary operations and
//! function calls. The tree is rendered back into the formula text the user
//! typed, e.g. `(d0 * 2 mm)` or `max(d1; 5 mm)`.
//!
//! Literal values are stored in database units; the unit record attached to
//! a literal converts them for display (`value / factor + offset`).

use thiserror::Error;

use crate::model::node::Node;
use crate::model::segment::SegmentNodeTable;
use crate::model::value::Value;

/// Deepest expression tree rendered before giving up.
const MAX_DEPTH: usize = 256;

/// Formula rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append unit symbols to literals.
    pub with_units: bool,
    /// Render for display only. Functions and operators that have no
    /// equivalent in the host's formula language are accepted.
    pub plain_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            with_units: true,
            plain_text: false,
        }
    }
}

/// Reasons a formula cannot be rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("function '{0}' has no formula equivalent")]
    UnsupportedFunction(&'static str),

    #[error("operator '{0}' has no formula equivalent")]
    UnsupportedOperator(&'static str),

    #[error("unknown function code {0:#04X}")]
    UnknownFunction(u16),

    #[error("node {node} has no operand '{name}'")]
    MissingOperand { node: u32, name: &'static str },

    #[error("node {0} is not part of an expression")]
    NotAnExpression(u32),

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Function code → name.
const FUNCTIONS: &[(u16, &str)] = &[
    (0x01, "cos"),
    (0x02, "sin"),
    (0x03, "tan"),
    (0x04, "acos"),
    (0x05, "asin"),
    (0x06, "atan"),
    (0x07, "cosh"),
    (0x08, "sinh"),
    (0x09, "tanh"),
    (0x0A, "acosh"),
    (0x0B, "asinh"),
    (0x0C, "atanh"),
    (0x0D, "sqrt"),
    (0x0E, "exp"),
    (0x0F, "ln"),
    (0x10, "log"),
    (0x11, "abs"),
    (0x12, "sign"),
    (0x13, "floor"),
    (0x14, "ceil"),
    (0x15, "round"),
    (0x16, "random"),
    (0x17, "isolate"),
    (0x18, "max"),
    (0x19, "min"),
    (0x1A, "pow"),
];

/// Functions the formula language lacks.
const UNSUPPORTED_FUNCTIONS: &[&str] = &["sign", "random", "acosh", "asinh", "atanh", "isolate"];

/// Name of a function code.
pub fn function_name(code: u16) -> Option<&'static str> {
    FUNCTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Format a number without float noise; integral values print without a
/// fraction.
pub fn format_number(value: f64) -> String {
    let rounded = if value.abs() > 1e15 {
        value
    } else {
        (value * 1e12).round() / 1e12
    };
    if rounded == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Render the formula of a `Parameter` node.
pub fn render_parameter(
    table: &SegmentNodeTable,
    index: u32,
    options: RenderOptions,
) -> Result<String, ExpressionError> {
    let node = table.get(index).ok_or(ExpressionError::NotAnExpression(index))?;
    if node.type_name != Some("Parameter") {
        return Err(ExpressionError::NotAnExpression(index));
    }
    match child(node, "refValue") {
        Some(value) => Renderer { table, options }.render(value, 0),
        None => nominal_value(table, index, options.with_units)
            .ok_or(ExpressionError::MissingOperand {
                node: index,
                name: "refValue",
            }),
    }
}

/// The parameter's stored value, converted to its display unit.
pub fn nominal_value(table: &SegmentNodeTable, index: u32, with_units: bool) -> Option<String> {
    let node = table.get(index)?;
    let value = node.attributes.get_f64("value")?;
    Some(literal(table, node, value, false, with_units))
}

/// Formula of a parameter, falling back to its nominal value when the
/// expression cannot be rendered. The error, if any, is returned alongside.
pub fn parameter_formula(
    table: &SegmentNodeTable,
    index: u32,
    options: RenderOptions,
) -> (Option<String>, Option<ExpressionError>) {
    match render_parameter(table, index, options) {
        Ok(text) => (Some(text), None),
        Err(e) => (nominal_value(table, index, options.with_units), Some(e)),
    }
}

/// Resolved child reference target.
fn child(node: &Node, name: &str) -> Option<u32> {
    node.attributes.get_ref(name).and_then(|r| r.target_index())
}

/// Unit conversion and symbol of a node's `unit` cross reference.
fn unit_of<'t>(table: &'t SegmentNodeTable, node: &Node) -> Option<&'t Node> {
    let unit = child(node, "unit").and_then(|i| table.get(i))?;
    (unit.type_name == Some("ParameterUnit")).then_some(unit)
}

fn literal(
    table: &SegmentNodeTable,
    node: &Node,
    value: f64,
    integer: bool,
    with_units: bool,
) -> String {
    let unit = unit_of(table, node);
    let factor = unit
        .and_then(|u| u.attributes.get_f64("factor"))
        .filter(|f| *f != 0.0)
        .unwrap_or(1.0);
    let offset = unit.and_then(|u| u.attributes.get_f64("offset")).unwrap_or(0.0);
    let shown = value * (1.0 / factor) + offset;
    let mut text = if integer {
        format!("{}", shown.round() as i64)
    } else {
        format_number(shown)
    };
    if with_units {
        if let Some(symbol) = unit.and_then(|u| u.name.as_deref()).filter(|s| !s.is_empty()) {
            text.push(' ');
            text.push_str(symbol);
        }
    }
    text
}

struct Renderer<'t> {
    table: &'t SegmentNodeTable,
    options: RenderOptions,
}

impl<'t> Renderer<'t> {
    fn node(&self, index: u32) -> Result<&'t Node, ExpressionError> {
        self.table
            .get(index)
            .ok_or(ExpressionError::NotAnExpression(index))
    }

    fn operand(
        &self,
        node: &Node,
        name: &'static str,
        depth: usize,
    ) -> Result<String, ExpressionError> {
        let target = child(node, name).ok_or(ExpressionError::MissingOperand {
            node: node.index,
            name,
        })?;
        self.render(target, depth + 1)
    }

    fn render(&self, index: u32, depth: usize) -> Result<String, ExpressionError> {
        if depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        let node = self.node(index)?;
        let type_name = node.type_name.ok_or(ExpressionError::NotAnExpression(index))?;

        let op = match type_name {
            "ParameterValue" => {
                let value = node.attributes.get_f64("value").unwrap_or(0.0);
                let integer = node.attributes.get_i64("type").map_or(false, |t| t != 0);
                return Ok(literal(self.table, node, value, integer, self.options.with_units));
            }
            "ValueByte" | "ValueSInt32" | "ValueUInt32" | "ValueDouble" => {
                return Ok(node
                    .attributes
                    .get("value")
                    .map(value_literal)
                    .unwrap_or_default());
            }
            "ParameterConstant" => {
                return Ok(match &node.name {
                    Some(name) => name.clone(),
                    None => format_number(node.attributes.get_f64("value").unwrap_or(0.0)),
                });
            }
            "ParameterRef" => {
                let target = child(node, "target").ok_or(ExpressionError::MissingOperand {
                    node: index,
                    name: "target",
                })?;
                let target = self.node(target)?;
                return target.name.clone().ok_or(ExpressionError::MissingOperand {
                    node: target.index,
                    name: "name",
                });
            }
            "Parameter" => return self.operand(node, "refValue", depth),
            "ParameterUnaryMinus" => {
                return Ok(format!("-{}", self.operand(node, "value", depth)?));
            }
            "ParameterFunction" => return self.function(node, depth),
            "ParameterOperationPowerIdent" => return self.operand(node, "operand1", depth),
            "ParameterOperationPlus" => "+",
            "ParameterOperationMinus" => "-",
            "ParameterOperationMul" => "*",
            "ParameterOperationDiv" => "/",
            "ParameterOperationPower" => "^",
            "ParameterOperationModulo" => {
                if !self.options.plain_text {
                    return Err(ExpressionError::UnsupportedOperator("%"));
                }
                "%"
            }
            _ => return Err(ExpressionError::NotAnExpression(index)),
        };

        let a = self.operand(node, "operand1", depth)?;
        let b = self.operand(node, "operand2", depth)?;
        Ok(format!("({a} {op} {b})"))
    }

    fn function(&self, node: &Node, depth: usize) -> Result<String, ExpressionError> {
        let code = node.attributes.get_i64("code").unwrap_or(0) as u16;
        let name = function_name(code).ok_or(ExpressionError::UnknownFunction(code))?;
        if !self.options.plain_text && UNSUPPORTED_FUNCTIONS.contains(&name) {
            return Err(ExpressionError::UnsupportedFunction(name));
        }

        let mut options = self.options;
        if name == "tanh" {
            // tanh takes a plain number
            options.with_units = false;
        }
        let inner = Renderer {
            table: self.table,
            options,
        };

        let mut args = Vec::new();
        if let Some(list) = node.attributes.get_list("operands") {
            for item in &list.items {
                let target = item
                    .as_node_ref()
                    .and_then(|r| r.target_index())
                    .ok_or(ExpressionError::MissingOperand {
                        node: node.index,
                        name: "operands",
                    })?;
                args.push(inner.render(target, depth + 1)?);
            }
        }
        Ok(format!("{name}({})", args.join("; ")))
    }
}

/// Display form of a scalar value.
pub fn value_literal(value: &Value) -> String {
    match value {
        Value::F32(v) => format_number(*v as f64),
        Value::F64(v) => format_number(*v),
        Value::Text(s, _) => s.clone(),
        other => other
            .as_i64()
            .map(|v| v.to_string())
            .unwrap_or_else(|| format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::segment::flavor::ReaderFlavor;
    use crate::io::segment::header::SegmentHeader;
    use crate::io::segment::registry::TypeRegistry;
    use crate::model::node_ref::{NodeRef, RefKind, RefTarget};
    use crate::model::value::{ListShape, ListValue};
    use crate::types::{FormatVersion, TypeId};

    struct Fixture {
        table: SegmentNodeTable,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                table: SegmentNodeTable::new(
                    SegmentHeader::empty("AmDcSegment", FormatVersion::V2012),
                    TypeRegistry::default(),
                    ReaderFlavor::Dc,
                    "RSeStorage/M1",
                ),
            }
        }

        fn add(&mut self, type_name: &'static str, attrs: Vec<(&'static str, Value)>) -> u32 {
            let index = self.table.len() as u32 + 1;
            let mut node = Node::new(index, TypeId::NIL, 0, Vec::new());
            node.type_name = Some(type_name);
            for (name, value) in attrs {
                node.attributes.replace(name, value);
            }
            self.table.push(node);
            index
        }

        fn named(&mut self, index: u32, name: &str) {
            self.table.get_mut(index).unwrap().name = Some(name.to_string());
        }

        fn link(&mut self, from: u32, name: &'static str, to: u32, kind: RefKind) {
            let mut r = NodeRef::to_index(to, kind);
            r.target = RefTarget::Node(to);
            self.table
                .get_mut(from)
                .unwrap()
                .attributes
                .replace(name, Value::Ref(r));
        }

        fn mm(&mut self) -> u32 {
            let unit = self.add(
                "ParameterUnit",
                vec![("factor", Value::F64(0.1)), ("offset", Value::F64(0.0))],
            );
            self.named(unit, "mm");
            unit
        }

        fn literal(&mut self, value: f64, unit: Option<u32>) -> u32 {
            let node = self.add(
                "ParameterValue",
                vec![("value", Value::F64(value)), ("type", Value::U16(0))],
            );
            if let Some(unit) = unit {
                self.link(node, "unit", unit, RefKind::Cross);
            }
            node
        }

        fn parameter(&mut self, name: &str, value: f64, expr: u32, unit: u32) -> u32 {
            let p = self.add("Parameter", vec![("value", Value::F64(value))]);
            self.named(p, name);
            self.link(p, "refValue", expr, RefKind::Child);
            self.link(p, "unit", unit, RefKind::Cross);
            p
        }
    }

    #[test]
    fn test_literal_with_units() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let lit = f.literal(1.0, Some(mm));
        let p = f.parameter("d0", 1.0, lit, mm);
        assert_eq!(render_parameter(&f.table, p, RenderOptions::default()).unwrap(), "10 mm");
        let plain = RenderOptions {
            with_units: false,
            plain_text: false,
        };
        assert_eq!(render_parameter(&f.table, p, plain).unwrap(), "10");
    }

    #[test]
    fn test_operation_and_reference() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let lit = f.literal(0.5, Some(mm));
        let d0 = f.parameter("d0", 0.5, lit, mm);
        let reference = f.add("ParameterRef", vec![]);
        f.link(reference, "target", d0, RefKind::Cross);
        let two = f.add(
            "ParameterValue",
            vec![("value", Value::F64(2.0)), ("type", Value::U16(1))],
        );
        let mul = f.add("ParameterOperationMul", vec![]);
        f.link(mul, "operand1", reference, RefKind::Child);
        f.link(mul, "operand2", two, RefKind::Child);
        let d1 = f.parameter("d1", 1.0, mul, mm);
        assert_eq!(
            render_parameter(&f.table, d1, RenderOptions::default()).unwrap(),
            "(d0 * 2)"
        );
    }

    #[test]
    fn test_unary_minus_and_function() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let a = f.literal(0.3, Some(mm));
        let b = f.literal(0.5, Some(mm));
        let func = f.add("ParameterFunction", vec![("code", Value::U16(0x18))]);
        let mut operands = Vec::new();
        for (i, target) in [a, b].into_iter().enumerate() {
            let mut r = NodeRef::to_index(target, RefKind::Child).with_number(i as u32);
            r.target = RefTarget::Node(target);
            operands.push(Value::Ref(r));
        }
        f.table.get_mut(func).unwrap().attributes.replace(
            "operands",
            Value::List(ListValue {
                shape: ListShape::Sequence,
                items: operands,
            }),
        );
        let neg = f.add("ParameterUnaryMinus", vec![]);
        f.link(neg, "value", func, RefKind::Child);
        let p = f.parameter("d2", -0.5, neg, mm);
        assert_eq!(
            render_parameter(&f.table, p, RenderOptions::default()).unwrap(),
            "-max(3 mm; 5 mm)"
        );
    }

    #[test]
    fn test_tanh_drops_units() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let a = f.literal(0.1, Some(mm));
        let func = f.add("ParameterFunction", vec![("code", Value::U16(0x09))]);
        let mut r = NodeRef::to_index(a, RefKind::Child).with_number(0);
        r.target = RefTarget::Node(a);
        f.table.get_mut(func).unwrap().attributes.replace(
            "operands",
            Value::List(ListValue {
                shape: ListShape::Sequence,
                items: vec![Value::Ref(r)],
            }),
        );
        let p = f.parameter("d3", 0.0, func, mm);
        assert_eq!(
            render_parameter(&f.table, p, RenderOptions::default()).unwrap(),
            "tanh(1)"
        );
    }

    #[test]
    fn test_unsupported_function_falls_back() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let func = f.add("ParameterFunction", vec![("code", Value::U16(0x16))]);
        let p = f.parameter("d4", 2.0, func, mm);
        let (text, error) = parameter_formula(&f.table, p, RenderOptions::default());
        assert_eq!(text.as_deref(), Some("20 mm"));
        assert_eq!(error, Some(ExpressionError::UnsupportedFunction("random")));

        let plain = RenderOptions {
            with_units: true,
            plain_text: true,
        };
        assert_eq!(render_parameter(&f.table, p, plain).unwrap(), "random()");
    }

    #[test]
    fn test_modulo_only_in_plain_text() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let a = f.literal(0.7, None);
        let b = f.literal(0.2, None);
        let modulo = f.add("ParameterOperationModulo", vec![]);
        f.link(modulo, "operand1", a, RefKind::Child);
        f.link(modulo, "operand2", b, RefKind::Child);
        let p = f.parameter("d5", 0.1, modulo, mm);
        assert_eq!(
            render_parameter(&f.table, p, RenderOptions::default()),
            Err(ExpressionError::UnsupportedOperator("%"))
        );
        let plain = RenderOptions {
            with_units: false,
            plain_text: true,
        };
        assert_eq!(render_parameter(&f.table, p, plain).unwrap(), "(0.7 % 0.2)");
    }

    #[test]
    fn test_power_ident_renders_base() {
        let mut f = Fixture::new();
        let mm = f.mm();
        let a = f.literal(0.4, Some(mm));
        let b = f.literal(1.0, None);
        let pow = f.add("ParameterOperationPowerIdent", vec![]);
        f.link(pow, "operand1", a, RefKind::Child);
        f.link(pow, "operand2", b, RefKind::Child);
        let p = f.parameter("d6", 0.4, pow, mm);
        assert_eq!(
            render_parameter(&f.table, p, RenderOptions::default()).unwrap(),
            "4 mm"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.000000000000002), "10");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e300), format!("{}", 1e300));
        assert!(!format_number(-2e297).contains("inf"));
        assert_eq!(function_name(0x1A), Some("pow"));
        assert_eq!(function_name(0x40), None);
    }
}
