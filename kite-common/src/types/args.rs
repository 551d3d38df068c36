use proc_macro2::Span;
use syn::{LitStr, Type};

use crate::types::descriptor::ComponentModel;

/// 默认的实现类型名后缀
pub const DEFAULT_SUFFIX: &str = "Impl";

/// `#[rest_client(...)]` 的接口级配置
///
/// | 键          | 默认值                          |
/// |-------------|---------------------------------|
/// | `base_url`  | `""`（无公共前缀）              |
/// | `suffix`    | `"Impl"`                        |
/// | `client`    | `::kite_common::ReqwestClient`  |
/// | `converter` | 必填                            |
/// | `component` | `standalone`                    |
pub struct ClientConfig {
    pub base_url: Option<LitStr>,
    pub suffix: Option<LitStr>,
    pub client: Option<Type>,
    pub converter: Type,
    pub component: ComponentModel,
    pub component_span: Span,
}

impl ClientConfig {
    pub fn base_url(&self) -> String {
        self.base_url.as_ref().map(LitStr::value).unwrap_or_default()
    }

    pub fn suffix(&self) -> String {
        self.suffix
            .as_ref()
            .map(LitStr::value)
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string())
    }

    pub fn client_type(&self) -> Type {
        self.client
            .clone()
            .unwrap_or_else(|| syn::parse_quote! { ::kite_common::ReqwestClient })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig {
            base_url: None,
            suffix: None,
            client: None,
            converter: parse_quote! { JsonConverterFactory },
            component: ComponentModel::default(),
            component_span: Span::call_site(),
        };

        assert_eq!(config.base_url(), "");
        assert_eq!(config.suffix(), "Impl");
        let client = config.client_type();
        assert_eq!(
            quote!(#client).to_string(),
            quote!(::kite_common::ReqwestClient).to_string()
        );
        assert_eq!(config.component, ComponentModel::Standalone);
    }
}
