/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// `${ENV_VAR:-fallback}` substitutes `fallback` when the variable is unset.
/// Unresolvable variables without a fallback are left as-is.
pub fn substitute_env(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // consume '{'

        let mut body = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            body.push(c);
        }
        if !closed || body.is_empty() {
            // Malformed — emit literal.
            result.push_str("${");
            result.push_str(&body);
            continue;
        }

        let (var_name, fallback) = match body.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (body.as_str(), None),
        };

        match std::env::var(var_name) {
            Ok(val) => result.push_str(&val),
            Err(_) => match fallback {
                Some(default) => result.push_str(default),
                None => {
                    // Leave unresolved placeholder as-is.
                    result.push_str("${");
                    result.push_str(&body);
                    result.push('}');
                },
            },
        }
    }

    result
}
