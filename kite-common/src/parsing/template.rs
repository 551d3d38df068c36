/// 提取 URL 模板中的 `{name}` 占位符，按首次出现的顺序去重
///
/// 名称必须以字母开头，只含字母、数字、`_` 和 `-`；其他花括号内容原样保留，不视为占位符。
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut placeholders: Vec<String> = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            continue;
        }
        let mut placeholder = String::new();
        let mut closed = false;
        while let Some(&next) = chars.peek() {
            if next == '{' {
                break;
            }
            chars.next();
            if next == '}' {
                closed = true;
                break;
            }
            placeholder.push(next);
        }
        if closed && is_placeholder_name(&placeholder) && !placeholders.contains(&placeholder) {
            placeholders.push(placeholder);
        }
    }

    placeholders
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}
