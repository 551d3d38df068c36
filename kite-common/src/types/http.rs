use std::fmt;

use proc_macro2::{Ident, Span};

/// HTTP 方法枚举
///
/// 同时用于编译期（动词标记）和运行期（请求描述）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// 返回HTTP方法的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// 标记属性名，例如 `#[get("/users")]` 中的 `get`
    pub fn attribute_name(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }

    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.attribute_name() == name)
    }

    /// 返回用于生成代码的枚举变体标识符
    pub fn variant_ident(&self) -> Ident {
        Ident::new(
            match self {
                HttpMethod::Get => "Get",
                HttpMethod::Post => "Post",
                HttpMethod::Put => "Put",
                HttpMethod::Patch => "Patch",
                HttpMethod::Delete => "Delete",
                HttpMethod::Head => "Head",
                HttpMethod::Options => "Options",
            },
            Span::call_site(),
        )
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求体编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// 无特殊编码，`#[body]` 参数交给转换器处理
    #[default]
    None,
    FormUrlEncoded,
    Multipart,
}

impl Encoding {
    pub fn variant_ident(&self) -> Ident {
        Ident::new(
            match self {
                Encoding::None => "None",
                Encoding::FormUrlEncoded => "FormUrlEncoded",
                Encoding::Multipart => "Multipart",
            },
            Span::call_site(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Options.as_str(), "OPTIONS");
    }

    #[test]
    fn test_from_attribute_name() {
        assert_eq!(HttpMethod::from_attribute_name("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_attribute_name("head"), Some(HttpMethod::Head));
        assert_eq!(HttpMethod::from_attribute_name("GET"), None);
        assert_eq!(HttpMethod::from_attribute_name("query"), None);
    }

    #[test]
    fn test_variant_ident() {
        assert_eq!(HttpMethod::Delete.variant_ident().to_string(), "Delete");
        assert_eq!(Encoding::FormUrlEncoded.variant_ident().to_string(), "FormUrlEncoded");
    }
}
