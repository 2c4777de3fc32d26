use ast::*;

/// Formats a number the way `Number.prototype.toString()` does.
pub fn number_to_js_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value == 0.0 {
        return "0".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if value < 0.0 {
        return format!("-{}", number_to_js_string(-value));
    }

    // Shortest round-tripping digits, e.g. `1.2345e-7`.
    let exp_repr = format!("{:e}", value);
    let (mantissa, exp) = match exp_repr.split_once('e') {
        Some(parts) => parts,
        None => return exp_repr,
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp.parse::<i32>().unwrap_or(0) + 1;

    if k <= n && n <= 21 {
        let mut s = digits;
        s.extend(std::iter::repeat('0').take((n - k) as usize));
        s
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let e = (n - 1).abs();
        if k == 1 {
            format!("{}e{}{}", digits, sign, e)
        } else {
            format!("{}.{}e{}{}", &digits[..1], &digits[1..], sign, e)
        }
    }
}

/// Quotes a string value as a double quoted literal.
pub fn quote_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000b}' => out.push_str("\\v"),
            '\u{000c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether printing `expr` at the start of an expression statement would
/// begin with `function` or `{`, which would be read as a declaration or a
/// block.
pub fn starts_with_fn_or_object(expr: &Expr) -> bool {
    match expr {
        Expr::Fn(_) | Expr::Object(_) => true,
        Expr::Bin(e) => starts_with_fn_or_object(&e.left),
        Expr::Assign(e) => starts_with_fn_or_object(&e.left),
        Expr::Cond(e) => starts_with_fn_or_object(&e.test),
        Expr::Call(e) => starts_with_fn_or_object(&e.callee),
        Expr::Member(e) => starts_with_fn_or_object(&e.obj),
        Expr::Update(e) if !e.prefix => starts_with_fn_or_object(&e.arg),
        Expr::Seq(e) => e.exprs.first().map_or(false, starts_with_fn_or_object),
        _ => false,
    }
}

/// Whether an `if` statement without `else` is the last thing in `stmt`, so
/// that a following `else` would attach to it.
pub fn ends_with_open_if(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::If(s) => match &s.alt {
            Some(alt) => ends_with_open_if(alt),
            None => true,
        },
        Stmt::For(s) => ends_with_open_if(&s.body),
        Stmt::ForIn(s) => ends_with_open_if(&s.body),
        Stmt::While(s) => ends_with_open_if(&s.body),
        Stmt::Labeled(s) => ends_with_open_if(&s.body),
        Stmt::With(s) => ends_with_open_if(&s.body),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(number_to_js_string(0.0), "0");
        assert_eq!(number_to_js_string(-0.0), "0");
        assert_eq!(number_to_js_string(1.0), "1");
        assert_eq!(number_to_js_string(123.0), "123");
        assert_eq!(number_to_js_string(1.5), "1.5");
        assert_eq!(number_to_js_string(0.1), "0.1");
        assert_eq!(number_to_js_string(0.000001), "0.000001");
        assert_eq!(number_to_js_string(0.0000001), "1e-7");
        assert_eq!(number_to_js_string(1e21), "1e+21");
        assert_eq!(number_to_js_string(1.5e300), "1.5e+300");
        assert_eq!(number_to_js_string(123456789012345680000.0), "123456789012345680000");
        assert_eq!(number_to_js_string(-2.5), "-2.5");
        assert_eq!(number_to_js_string(f64::NAN), "NaN");
        assert_eq!(number_to_js_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn strings() {
        assert_eq!(quote_str("a\"b"), r#""a\"b""#);
        assert_eq!(quote_str("a\nb\\"), r#""a\nb\\""#);
        assert_eq!(quote_str("\u{1}"), r#""\x01""#);
    }
}
