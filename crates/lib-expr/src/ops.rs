//! Operator tables.
//!
//! Every operator accepted on the right-hand side of an equation is a variant
//! here. Elementwise operators have a scalar kernel; the remaining ones
//! (`del`, `atan2`, `dY/dX`, `integ`) need the whole column.

use lib_types::numeric::{cumtrapz, diff_repeat_last, gradient, unwrap_phase};
use num_complex::Complex64;
use std::f64::consts::{LN_10, LN_2};
use std::str::FromStr;

/// Prefix operators, `lhs = op x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Sign,
    Reciprocal,
    Sqrt,
    Square,
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Expm1,
    Exp2,
    Log,
    Log10,
    Log2,
    Log1p,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Degrees,
    Radians,
    Rint,
    Fix,
    Floor,
    Ceil,
    Trunc,
    /// Successive difference, last value repeated.
    Del,
    /// Logical negation, 0/1.
    Not,
}

impl FromStr for UnaryOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use UnaryOp::*;
        Ok(match s {
            "-" => Neg,
            "sign" => Sign,
            "reciprocal" => Reciprocal,
            "sqrt" => Sqrt,
            "square" => Square,
            "abs" => Abs,
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "exp" => Exp,
            "expm1" => Expm1,
            "exp2" => Exp2,
            "log" => Log,
            "log10" => Log10,
            "log2" => Log2,
            "log1p" => Log1p,
            "sinh" => Sinh,
            "cosh" => Cosh,
            "tanh" => Tanh,
            "asinh" => Asinh,
            "acosh" => Acosh,
            "atanh" => Atanh,
            "degrees" | "rad2deg" => Degrees,
            "radians" | "deg2rad" => Radians,
            "rint" => Rint,
            "fix" => Fix,
            "floor" => Floor,
            "ceil" => Ceil,
            "trunc" => Trunc,
            "del" => Del,
            "not" | "!" => Not,
            _ => return Err(()),
        })
    }
}

fn sign(x: f64) -> f64 {
    if x.is_nan() {
        f64::NAN
    } else if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl UnaryOp {
    /// Scalar kernel; `None` for column-wise operators.
    pub fn scalar(self, x: f64) -> Option<f64> {
        use UnaryOp::*;
        Some(match self {
            Neg => -x,
            Sign => sign(x),
            Reciprocal => 1.0 / x,
            Sqrt => x.sqrt(),
            Square => x * x,
            Abs => x.abs(),
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Asin => x.asin(),
            Acos => x.acos(),
            Atan => x.atan(),
            Exp => x.exp(),
            Expm1 => x.exp_m1(),
            Exp2 => x.exp2(),
            Log => x.ln(),
            Log10 => x.log10(),
            Log2 => x.log2(),
            Log1p => x.ln_1p(),
            Sinh => x.sinh(),
            Cosh => x.cosh(),
            Tanh => x.tanh(),
            Asinh => x.asinh(),
            Acosh => x.acosh(),
            Atanh => x.atanh(),
            Degrees => x.to_degrees(),
            Radians => x.to_radians(),
            Rint => x.round_ties_even(),
            Fix | Trunc => x.trunc(),
            Floor => x.floor(),
            Ceil => x.ceil(),
            Not => truth(x == 0.0),
            Del => return None,
        })
    }

    /// Apply to a whole column.
    pub fn apply(self, x: &[f64]) -> Vec<f64> {
        match self {
            UnaryOp::Del => diff_repeat_last(x),
            op => x.iter().map(|&v| op.scalar(v).unwrap_or(f64::NAN)).collect(),
        }
    }

    /// Complex kernel; `None` for operators without a complex meaning.
    pub fn complex(self, z: Complex64) -> Option<Complex64> {
        use UnaryOp::*;
        let one = Complex64::new(1.0, 0.0);
        Some(match self {
            Neg => -z,
            Reciprocal => one / z,
            Sqrt => z.sqrt(),
            Square => z * z,
            Abs => Complex64::new(z.norm(), 0.0),
            Sin => z.sin(),
            Cos => z.cos(),
            Tan => z.tan(),
            Asin => z.asin(),
            Acos => z.acos(),
            Atan => z.atan(),
            Exp => z.exp(),
            Expm1 => z.exp() - one,
            Exp2 => (z * LN_2).exp(),
            Log => z.ln(),
            Log10 => z.ln() / LN_10,
            Log2 => z.ln() / LN_2,
            Log1p => (z + one).ln(),
            Sinh => z.sinh(),
            Cosh => z.cosh(),
            Tanh => z.tanh(),
            Asinh => z.asinh(),
            Acosh => z.acosh(),
            Atanh => z.atanh(),
            _ => return None,
        })
    }
}

/// Infix operators, `lhs = y op x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    FloorDivide,
    Fmod,
    Mod,
    Hypot,
    Max,
    Min,
    /// Unwrapped `atan2(y, x)`.
    Atan2,
    /// Gradient ratio `dy/dx`.
    Derivative,
    /// Cumulative trapezoidal integral of `y` over `x`.
    Integ,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    And,
    Or,
    Xor,
}

impl FromStr for BinaryOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use BinaryOp::*;
        Ok(match s {
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" | "true_divide" => Div,
            "^" => Pow,
            "floor_divide" => FloorDivide,
            "fmod" => Fmod,
            "mod" | "rem" => Mod,
            "hypot" => Hypot,
            "max" => Max,
            "min" => Min,
            "atan2" => Atan2,
            "dY/dX" => Derivative,
            "integ" => Integ,
            "==" => Eq,
            "!=" => Ne,
            "<=" => Le,
            ">=" => Ge,
            "<" => Lt,
            ">" => Gt,
            "&&" | "and" => And,
            "||" | "or" => Or,
            "xor" => Xor,
            _ => return Err(()),
        })
    }
}

/// Modulo with the sign of the divisor.
fn floored_mod(y: f64, x: f64) -> f64 {
    let r = y % x;
    if r != 0.0 && (r < 0.0) != (x < 0.0) {
        r + x
    } else {
        r
    }
}

fn nan_max(y: f64, x: f64) -> f64 {
    if y.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        y.max(x)
    }
}

fn nan_min(y: f64, x: f64) -> f64 {
    if y.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        y.min(x)
    }
}

impl BinaryOp {
    /// Scalar kernel; `None` for column-wise operators.
    pub fn scalar(self, y: f64, x: f64) -> Option<f64> {
        use BinaryOp::*;
        Some(match self {
            Add => y + x,
            Sub => y - x,
            Mul => y * x,
            Div => y / x,
            Pow => y.powf(x),
            FloorDivide => (y / x).floor(),
            Fmod => y % x,
            Mod => floored_mod(y, x),
            Hypot => y.hypot(x),
            Max => nan_max(y, x),
            Min => nan_min(y, x),
            Eq => truth(y == x),
            Ne => truth(y != x),
            Le => truth(y <= x),
            Ge => truth(y >= x),
            Lt => truth(y < x),
            Gt => truth(y > x),
            And => truth(y != 0.0 && x != 0.0),
            Or => truth(y != 0.0 || x != 0.0),
            Xor => truth((y != 0.0) != (x != 0.0)),
            Atan2 | Derivative | Integ => return None,
        })
    }

    /// Apply to two equal-length columns.
    pub fn apply(self, y: &[f64], x: &[f64]) -> Vec<f64> {
        match self {
            BinaryOp::Atan2 => {
                let angle: Vec<f64> = y.iter().zip(x).map(|(a, b)| a.atan2(*b)).collect();
                unwrap_phase(&angle)
            }
            BinaryOp::Derivative => gradient(y)
                .into_iter()
                .zip(gradient(x))
                .map(|(dy, dx)| dy / dx)
                .collect(),
            BinaryOp::Integ => cumtrapz(y, x),
            op => y
                .iter()
                .zip(x)
                .map(|(&a, &b)| op.scalar(a, b).unwrap_or(f64::NAN))
                .collect(),
        }
    }

    /// Complex kernel; `None` for operators without a complex meaning.
    pub fn complex(self, y: Complex64, x: Complex64) -> Option<Complex64> {
        use BinaryOp::*;
        Some(match self {
            Add => y + x,
            Sub => y - x,
            Mul => y * x,
            Div => y / x,
            Pow => y.powc(x),
            _ => return None,
        })
    }
}
