use syn::Attribute;

use crate::types::http::{Encoding, HttpMethod};

/// 参数角色的种类（不带参数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Body,
    Field,
    FieldMap,
    Part,
    PartMap,
    Path,
    Query,
    QueryMap,
    Url,
    Header,
    HeaderMap,
}

impl RoleKind {
    pub const ALL: [RoleKind; 11] = [
        RoleKind::Body,
        RoleKind::Field,
        RoleKind::FieldMap,
        RoleKind::Part,
        RoleKind::PartMap,
        RoleKind::Path,
        RoleKind::Query,
        RoleKind::QueryMap,
        RoleKind::Url,
        RoleKind::Header,
        RoleKind::HeaderMap,
    ];

    pub fn attribute_name(&self) -> &'static str {
        match self {
            RoleKind::Body => "body",
            RoleKind::Field => "field",
            RoleKind::FieldMap => "field_map",
            RoleKind::Part => "part",
            RoleKind::PartMap => "part_map",
            RoleKind::Path => "path",
            RoleKind::Query => "query",
            RoleKind::QueryMap => "query_map",
            RoleKind::Url => "url",
            RoleKind::Header => "header",
            RoleKind::HeaderMap => "header_map",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoleKind::Body => "@Body",
            RoleKind::Field => "@Field",
            RoleKind::FieldMap => "@FieldMap",
            RoleKind::Part => "@Part",
            RoleKind::PartMap => "@PartMap",
            RoleKind::Path => "@Path",
            RoleKind::Query => "@Query",
            RoleKind::QueryMap => "@QueryMap",
            RoleKind::Url => "@Url",
            RoleKind::Header => "@Header",
            RoleKind::HeaderMap => "@HeaderMap",
        }
    }

    /// 是否要求参数类型为字符串键的 Map
    pub fn is_map(&self) -> bool {
        matches!(
            self,
            RoleKind::FieldMap | RoleKind::QueryMap | RoleKind::PartMap | RoleKind::HeaderMap
        )
    }
}

/// 识别的声明式标记
///
/// 方法级：动词、`headers`、编码方式；参数级：各参数角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Verb(HttpMethod),
    Headers,
    FormUrlEncoded,
    Multipart,
    Role(RoleKind),
}

impl Marker {
    /// 根据属性名识别标记，只识别单段路径（如 `#[get]`，而非 `#[serde::get]`）
    pub fn from_attribute(attr: &Attribute) -> Option<Self> {
        let ident = attr.path().get_ident()?;
        Self::from_name(&ident.to_string())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(method) = HttpMethod::from_attribute_name(name) {
            return Some(Marker::Verb(method));
        }
        match name {
            "headers" => Some(Marker::Headers),
            "form_url_encoded" => Some(Marker::FormUrlEncoded),
            "multipart" => Some(Marker::Multipart),
            _ => RoleKind::ALL
                .into_iter()
                .find(|kind| kind.attribute_name() == name)
                .map(Marker::Role),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Marker::Verb(method) => match method {
                HttpMethod::Get => "@GET",
                HttpMethod::Post => "@POST",
                HttpMethod::Put => "@PUT",
                HttpMethod::Patch => "@PATCH",
                HttpMethod::Delete => "@DELETE",
                HttpMethod::Head => "@HEAD",
                HttpMethod::Options => "@OPTIONS",
            },
            Marker::Headers => "@Headers",
            Marker::FormUrlEncoded => "@FormUrlEncoded",
            Marker::Multipart => "@Multipart",
            Marker::Role(kind) => kind.display_name(),
        }
    }

    pub fn is_method_level(&self) -> bool {
        !matches!(self, Marker::Role(_))
    }

    pub fn encoding(&self) -> Option<Encoding> {
        match self {
            Marker::FormUrlEncoded => Some(Encoding::FormUrlEncoded),
            Marker::Multipart => Some(Encoding::Multipart),
            _ => None,
        }
    }
}

/// 参数在 HTTP 请求中的角色
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterRole {
    Path { name: String, encoded: bool },
    Query { name: String, encoded: bool },
    QueryMap { encoded: bool },
    Field { name: String, encoded: bool },
    FieldMap { encoded: bool },
    Part { name: String },
    PartMap,
    Body,
    Url,
    Header { name: String },
    HeaderMap,
}

impl ParameterRole {
    pub fn kind(&self) -> RoleKind {
        match self {
            ParameterRole::Path { .. } => RoleKind::Path,
            ParameterRole::Query { .. } => RoleKind::Query,
            ParameterRole::QueryMap { .. } => RoleKind::QueryMap,
            ParameterRole::Field { .. } => RoleKind::Field,
            ParameterRole::FieldMap { .. } => RoleKind::FieldMap,
            ParameterRole::Part { .. } => RoleKind::Part,
            ParameterRole::PartMap => RoleKind::PartMap,
            ParameterRole::Body => RoleKind::Body,
            ParameterRole::Url => RoleKind::Url,
            ParameterRole::Header { .. } => RoleKind::Header,
            ParameterRole::HeaderMap => RoleKind::HeaderMap,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ParameterRole::Path { name, .. }
            | ParameterRole::Query { name, .. }
            | ParameterRole::Field { name, .. }
            | ParameterRole::Part { name }
            | ParameterRole::Header { name } => Some(name),
            _ => None,
        }
    }

    pub fn encoded(&self) -> bool {
        match self {
            ParameterRole::Path { encoded, .. }
            | ParameterRole::Query { encoded, .. }
            | ParameterRole::QueryMap { encoded }
            | ParameterRole::Field { encoded, .. }
            | ParameterRole::FieldMap { encoded } => *encoded,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_marker_from_attribute() {
        let attr: Attribute = parse_quote! { #[get("/users")] };
        assert_eq!(Marker::from_attribute(&attr), Some(Marker::Verb(HttpMethod::Get)));

        let attr: Attribute = parse_quote! { #[field_map] };
        assert_eq!(Marker::from_attribute(&attr), Some(Marker::Role(RoleKind::FieldMap)));

        let attr: Attribute = parse_quote! { #[doc = "docs"] };
        assert_eq!(Marker::from_attribute(&attr), None);

        let attr: Attribute = parse_quote! { #[other::get] };
        assert_eq!(Marker::from_attribute(&attr), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Marker::Verb(HttpMethod::Post).display_name(), "@POST");
        assert_eq!(Marker::FormUrlEncoded.display_name(), "@FormUrlEncoded");
        assert_eq!(Marker::Role(RoleKind::HeaderMap).display_name(), "@HeaderMap");
    }

    #[test]
    fn test_role_accessors() {
        let role = ParameterRole::Query { name: "q".to_string(), encoded: true };
        assert_eq!(role.kind(), RoleKind::Query);
        assert_eq!(role.name(), Some("q"));
        assert!(role.encoded());
        assert!(RoleKind::PartMap.is_map());
        assert!(!RoleKind::Part.is_map());
    }
}
