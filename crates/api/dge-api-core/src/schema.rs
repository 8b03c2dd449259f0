//! Static attribute registry for every [`NodeKind`].
//!
//! Each node exposes scalar leaf attributes and compound attributes. A
//! compound always has exactly three scalar children (`X/Y/Z` or `R/G/B`) and
//! carries a 3-vector; a leaf carries one float. Both long and short names
//! resolve (`translateX` / `tx`).

use crate::{Arity, NodeKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Writable by static values and connections.
    Input,
    /// Computed by the node; may only be used as a connection source.
    Output,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub short: &'static str,
    pub direction: Direction,
    /// Initial value of a leaf. Unused on compounds.
    pub default: f64,
    pub children: &'static [AttributeSpec],
}

impl AttributeSpec {
    #[inline]
    pub fn arity(&self) -> Arity {
        if self.children.is_empty() {
            Arity::Scalar
        } else {
            Arity::Vec3
        }
    }

    #[inline]
    pub fn is_compound(&self) -> bool {
        !self.children.is_empty()
    }

    /// Leaf attributes backing this attribute: itself for a leaf, its children otherwise.
    pub fn leaves(&self) -> &[AttributeSpec] {
        if self.children.is_empty() {
            std::slice::from_ref(self)
        } else {
            self.children
        }
    }

    /// Leaf name for channel `index` (0..3). Leaves return their own name.
    pub fn channel(&self, index: usize) -> &'static str {
        match self.children.get(index) {
            Some(child) => child.name,
            None => self.name,
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name || self.short == name
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NodeSignature {
    pub kind: NodeKind,
    pub attributes: &'static [AttributeSpec],
    /// Plug a bare node name resolves to.
    pub primary: &'static str,
}

impl NodeSignature {
    /// Look up an attribute or a compound child by long or short name.
    pub fn find(&self, name: &str) -> Option<&AttributeSpec> {
        for attr in self.attributes {
            if attr.matches(name) {
                return Some(attr);
            }
            if let Some(child) = attr.children.iter().find(|c| c.matches(name)) {
                return Some(child);
            }
        }
        None
    }

    /// Every leaf attribute on the node, in declaration order.
    pub fn leaves(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().flat_map(|a| a.leaves().iter())
    }
}

macro_rules! leaf {
    ($name:literal, $short:literal, $dir:ident, $default:expr) => {
        AttributeSpec {
            name: $name,
            short: $short,
            direction: Direction::$dir,
            default: $default,
            children: &[],
        }
    };
}

macro_rules! compound {
    ($name:literal, $short:literal, $dir:ident, [$($child:expr),* $(,)?]) => {
        AttributeSpec {
            name: $name,
            short: $short,
            direction: Direction::$dir,
            default: 0.0,
            children: &[$($child),*],
        }
    };
}

macro_rules! xyz {
    ($name:literal, $short:literal, $dir:ident, $default:expr,
     [$x:literal, $xs:literal, $y:literal, $ys:literal, $z:literal, $zs:literal]) => {
        compound!($name, $short, $dir, [
            leaf!($x, $xs, $dir, $default),
            leaf!($y, $ys, $dir, $default),
            leaf!($z, $zs, $dir, $default),
        ])
    };
}

static PLUS_MINUS_AVERAGE: NodeSignature = NodeSignature {
    kind: NodeKind::PlusMinusAverage,
    attributes: &[
        xyz!("input1", "i1", Input, 0.0, ["input1X", "i1x", "input1Y", "i1y", "input1Z", "i1z"]),
        xyz!("input2", "i2", Input, 0.0, ["input2X", "i2x", "input2Y", "i2y", "input2Z", "i2z"]),
        xyz!("output", "o", Output, 0.0, ["outputX", "ox", "outputY", "oy", "outputZ", "oz"]),
    ],
    primary: "output",
};

static MULTIPLY_DIVIDE: NodeSignature = NodeSignature {
    kind: NodeKind::MultiplyDivide,
    attributes: &[
        xyz!("input1", "i1", Input, 0.0, ["input1X", "i1x", "input1Y", "i1y", "input1Z", "i1z"]),
        xyz!("input2", "i2", Input, 1.0, ["input2X", "i2x", "input2Y", "i2y", "input2Z", "i2z"]),
        xyz!("output", "o", Output, 0.0, ["outputX", "ox", "outputY", "oy", "outputZ", "oz"]),
    ],
    primary: "output",
};

static CONDITION: NodeSignature = NodeSignature {
    kind: NodeKind::Condition,
    attributes: &[
        leaf!("firstTerm", "ft", Input, 0.0),
        leaf!("secondTerm", "st", Input, 0.0),
        xyz!("colorIfTrue", "ct", Input, 0.0,
            ["colorIfTrueR", "ctr", "colorIfTrueG", "ctg", "colorIfTrueB", "ctb"]),
        xyz!("colorIfFalse", "cf", Input, 1.0,
            ["colorIfFalseR", "cfr", "colorIfFalseG", "cfg", "colorIfFalseB", "cfb"]),
        xyz!("outColor", "oc", Output, 0.0,
            ["outColorR", "ocr", "outColorG", "ocg", "outColorB", "ocb"]),
    ],
    primary: "outColor",
};

static CLAMP: NodeSignature = NodeSignature {
    kind: NodeKind::Clamp,
    attributes: &[
        xyz!("input", "ip", Input, 0.0, ["inputR", "ipr", "inputG", "ipg", "inputB", "ipb"]),
        xyz!("min", "mn", Input, 0.0, ["minR", "mnr", "minG", "mng", "minB", "mnb"]),
        xyz!("max", "mx", Input, 0.0, ["maxR", "mxr", "maxG", "mxg", "maxB", "mxb"]),
        xyz!("output", "op", Output, 0.0, ["outputR", "opr", "outputG", "opg", "outputB", "opb"]),
    ],
    primary: "output",
};

static BLEND: NodeSignature = NodeSignature {
    kind: NodeKind::Blend,
    attributes: &[
        xyz!("input1", "i1", Input, 0.0, ["input1X", "i1x", "input1Y", "i1y", "input1Z", "i1z"]),
        xyz!("input2", "i2", Input, 0.0, ["input2X", "i2x", "input2Y", "i2y", "input2Z", "i2z"]),
        leaf!("blender", "b", Input, 0.0),
        xyz!("output", "o", Output, 0.0, ["outputX", "ox", "outputY", "oy", "outputZ", "oz"]),
    ],
    primary: "output",
};

static TRIGONOMETRY: NodeSignature = NodeSignature {
    kind: NodeKind::Trigonometry,
    attributes: &[
        xyz!("input", "i", Input, 0.0, ["inputX", "ix", "inputY", "iy", "inputZ", "iz"]),
        xyz!("output", "o", Output, 0.0, ["outputX", "ox", "outputY", "oy", "outputZ", "oz"]),
    ],
    primary: "output",
};

static UNARY: NodeSignature = NodeSignature {
    kind: NodeKind::Unary,
    attributes: &[
        xyz!("input", "i", Input, 0.0, ["inputX", "ix", "inputY", "iy", "inputZ", "iz"]),
        xyz!("output", "o", Output, 0.0, ["outputX", "ox", "outputY", "oy", "outputZ", "oz"]),
    ],
    primary: "output",
};

static DISTANCE: NodeSignature = NodeSignature {
    kind: NodeKind::Distance,
    attributes: &[
        xyz!("point1", "p1", Input, 0.0, ["point1X", "p1x", "point1Y", "p1y", "point1Z", "p1z"]),
        xyz!("point2", "p2", Input, 0.0, ["point2X", "p2x", "point2Y", "p2y", "point2Z", "p2z"]),
        leaf!("distance", "d", Output, 0.0),
    ],
    primary: "distance",
};

static TRANSFORM: NodeSignature = NodeSignature {
    kind: NodeKind::Transform,
    attributes: &[
        xyz!("translate", "t", Input, 0.0,
            ["translateX", "tx", "translateY", "ty", "translateZ", "tz"]),
        xyz!("rotate", "r", Input, 0.0, ["rotateX", "rx", "rotateY", "ry", "rotateZ", "rz"]),
        xyz!("scale", "s", Input, 1.0, ["scaleX", "sx", "scaleY", "sy", "scaleZ", "sz"]),
    ],
    primary: "translate",
};

/// Registry lookup.
pub fn signature(kind: NodeKind) -> &'static NodeSignature {
    match kind {
        NodeKind::PlusMinusAverage => &PLUS_MINUS_AVERAGE,
        NodeKind::MultiplyDivide => &MULTIPLY_DIVIDE,
        NodeKind::Condition => &CONDITION,
        NodeKind::Clamp => &CLAMP,
        NodeKind::Blend => &BLEND,
        NodeKind::Trigonometry => &TRIGONOMETRY,
        NodeKind::Unary => &UNARY,
        NodeKind::Distance => &DISTANCE,
        NodeKind::Transform => &TRANSFORM,
    }
}
