//! 转换器契约和默认的 JSON 实现
//!
//! 生成的客户端在构造时通过 `ConverterFactory` 为每个用到的（种类，类型）
//! 组合创建一个转换器，之后每次调用都复用它。

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::runtime::error::{Error, Result};
use crate::runtime::http::{RequestBody, ResponseBody};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// 把路径、查询、表单字段和请求头的值转换成字符串
pub trait StringConverter<T: ?Sized>: Send + Sync {
    fn convert(&self, value: &T) -> Result<String>;
}

/// 把 `#[body]` 和 multipart 部件的值转换成请求体
pub trait RequestBodyConverter<T: ?Sized>: Send + Sync {
    fn convert(&self, value: &T) -> Result<RequestBody>;
}

/// 把响应体转换成返回值
pub trait ResponseBodyConverter<T>: Send + Sync {
    fn convert(&self, body: ResponseBody) -> Result<T>;
}

/// 转换器工厂，不支持的类型返回 `None`
///
/// 生成的客户端在 `build()` 时把 `None` 报告为 `Error::MissingConverter`。
pub trait ConverterFactory: Send + Sync + 'static {
    fn string_converter<T>(&self) -> Option<Box<dyn StringConverter<T>>>
    where
        T: Serialize + ?Sized + 'static,
    {
        None
    }

    fn request_body_converter<T>(&self) -> Option<Box<dyn RequestBodyConverter<T>>>
    where
        T: Serialize + ?Sized + 'static,
    {
        None
    }

    fn response_body_converter<T>(&self) -> Option<Box<dyn ResponseBodyConverter<T>>>
    where
        T: DeserializeOwned + 'static,
    {
        None
    }
}

/// 基于 serde_json 的转换器工厂
///
/// 字符串值中 JSON 字符串去掉引号，其他值使用 JSON 文本（`42`、`true`）；
/// 请求体为 `application/json; charset=UTF-8`。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverterFactory;

impl ConverterFactory for JsonConverterFactory {
    fn string_converter<T>(&self) -> Option<Box<dyn StringConverter<T>>>
    where
        T: Serialize + ?Sized + 'static,
    {
        Some(Box::new(JsonConverter::<T>::new()))
    }

    fn request_body_converter<T>(&self) -> Option<Box<dyn RequestBodyConverter<T>>>
    where
        T: Serialize + ?Sized + 'static,
    {
        Some(Box::new(JsonConverter::<T>::new()))
    }

    fn response_body_converter<T>(&self) -> Option<Box<dyn ResponseBodyConverter<T>>>
    where
        T: DeserializeOwned + 'static,
    {
        Some(Box::new(JsonConverter::<T>::new()))
    }
}

struct JsonConverter<T: ?Sized> {
    _marker: PhantomData<fn(&T) -> Option<Box<T>>>,
}

impl<T: ?Sized> JsonConverter<T> {
    fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T: Serialize + ?Sized> StringConverter<T> for JsonConverter<T> {
    fn convert(&self, value: &T) -> Result<String> {
        match serde_json::to_value(value)? {
            serde_json::Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }
}

impl<T: Serialize + ?Sized> RequestBodyConverter<T> for JsonConverter<T> {
    fn convert(&self, value: &T) -> Result<RequestBody> {
        let bytes = serde_json::to_vec(value)?;
        Ok(RequestBody::new(JSON_CONTENT_TYPE, bytes))
    }
}

impl<T: DeserializeOwned> ResponseBodyConverter<T> for JsonConverter<T> {
    fn convert(&self, body: ResponseBody) -> Result<T> {
        serde_json::from_slice(body.bytes()).map_err(Error::conversion)
    }
}
