//! printf-style number formatting for text reports.

fn non_finite(v: f64) -> Option<String> {
    if v.is_nan() {
        Some("nan".to_string())
    } else if v.is_infinite() {
        Some(if v > 0.0 { "inf" } else { "-inf" }.to_string())
    } else {
        None
    }
}

/// Split Rust's `{:e}` output into mantissa and exponent.
fn split_exp(s: &str) -> (&str, i32) {
    match s.split_once('e') {
        Some((m, e)) => (m, e.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn exponent_suffix(exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("e{}{:02}", sign, exp.abs())
}

/// C `%.{prec}e`: `1.235e+03`.
pub fn fmt_e(v: f64, prec: usize) -> String {
    if let Some(s) = non_finite(v) {
        return s;
    }
    let s = format!("{:.*e}", prec, v);
    let (mantissa, exp) = split_exp(&s);
    format!("{}{}", mantissa, exponent_suffix(exp))
}

/// C `%.{prec}g`: the shorter of fixed and exponential notation, without
/// trailing zeros.
pub fn fmt_g(v: f64, prec: usize) -> String {
    if let Some(s) = non_finite(v) {
        return s;
    }
    let p = prec.max(1);
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{:.*e}", p - 1, v);
    let (mantissa, exp) = split_exp(&s);
    if exp < -4 || exp >= p as i32 {
        format!("{}{}", strip_zeros(mantissa), exponent_suffix(exp))
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, v)).to_string()
    }
}

/// `%-12.4g`.
pub(crate) fn g12(v: f64) -> String {
    format!("{:<12}", fmt_g(v, 4))
}

/// `%10.3e`.
pub(crate) fn e10(v: f64) -> String {
    format!("{:>10}", fmt_e(v, 3))
}
