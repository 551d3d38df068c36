//! 基于语法树的类型查询
//!
//! 过程宏拿不到类型系统，这里用两种比较策略近似：
//! - 解析比较：通过已知类型表把写法规范化（`String`、`std::string::String`
//!   都是 `std::string::String`），未知路径按原文比较；
//! - 名称比较：只看最后一段路径，用于 `ResponseStream`、`HttpInfo` 等可选
//!   包装类型，用户怎样导入（或是否依赖）都不影响分析。

use std::collections::HashMap;

use syn::{GenericArgument, PathArguments, Type, TypeParamBound};

/// 能力类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    /// `String`、`str`、`Cow<str>`、`Box<str>`、`Arc<str>`、`Rc<str>`
    Str,
    /// `HashMap`、`BTreeMap`、`IndexMap`
    Map,
    /// `Vec`、`VecDeque`、切片、数组
    Sequence,
    /// `Vec<u8>`、`[u8]`、`bytes::Bytes`
    Bytes,
    /// `()`
    Unit,
}

const KNOWN_TYPES: &[(&str, &[&str])] = &[
    (
        "std::string::String",
        &["String", "string::String", "std::string::String", "alloc::string::String"],
    ),
    ("str", &["str", "std::primitive::str", "core::primitive::str"]),
    ("u8", &["u8", "std::primitive::u8", "core::primitive::u8"]),
    (
        "std::collections::HashMap",
        &[
            "HashMap",
            "hash_map::HashMap",
            "collections::HashMap",
            "std::collections::HashMap",
            "std::collections::hash_map::HashMap",
        ],
    ),
    (
        "std::collections::BTreeMap",
        &[
            "BTreeMap",
            "btree_map::BTreeMap",
            "collections::BTreeMap",
            "std::collections::BTreeMap",
            "std::collections::btree_map::BTreeMap",
            "alloc::collections::BTreeMap",
        ],
    ),
    ("indexmap::IndexMap", &["IndexMap", "indexmap::IndexMap", "indexmap::map::IndexMap"]),
    ("std::vec::Vec", &["Vec", "vec::Vec", "std::vec::Vec", "alloc::vec::Vec"]),
    (
        "std::collections::VecDeque",
        &["VecDeque", "collections::VecDeque", "std::collections::VecDeque", "alloc::collections::VecDeque"],
    ),
    (
        "std::option::Option",
        &["Option", "option::Option", "std::option::Option", "core::option::Option"],
    ),
    ("std::borrow::Cow", &["Cow", "borrow::Cow", "std::borrow::Cow", "alloc::borrow::Cow"]),
    ("std::boxed::Box", &["Box", "boxed::Box", "std::boxed::Box", "alloc::boxed::Box"]),
    ("std::sync::Arc", &["Arc", "sync::Arc", "std::sync::Arc", "alloc::sync::Arc"]),
    ("std::rc::Rc", &["Rc", "rc::Rc", "std::rc::Rc", "alloc::rc::Rc"]),
    ("bytes::Bytes", &["Bytes", "bytes::Bytes"]),
];

const STR_CLASS: &[&str] = &["std::string::String", "str"];
const STR_WRAPPERS: &[&str] = &["std::borrow::Cow", "std::boxed::Box", "std::sync::Arc", "std::rc::Rc"];
const MAP_CLASS: &[&str] = &[
    "std::collections::HashMap",
    "std::collections::BTreeMap",
    "indexmap::IndexMap",
];
const SEQUENCE_CLASS: &[&str] = &["std::vec::Vec", "std::collections::VecDeque"];

/// 类型查询工具，每次宏调用构造一个
#[derive(Debug, Clone)]
pub struct TypeIntrospector {
    aliases: HashMap<&'static str, &'static str>,
}

impl Default for TypeIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeIntrospector {
    pub fn new() -> Self {
        let aliases = KNOWN_TYPES
            .iter()
            .flat_map(|(canonical, spellings)| spellings.iter().map(move |s| (*s, *canonical)))
            .collect();
        Self { aliases }
    }

    /// 去掉引用、括号和不可见分组
    pub fn strip_reference<'a>(&self, ty: &'a Type) -> &'a Type {
        match ty {
            Type::Reference(reference) => self.strip_reference(&reference.elem),
            Type::Paren(paren) => self.strip_reference(&paren.elem),
            Type::Group(group) => self.strip_reference(&group.elem),
            other => other,
        }
    }

    /// 规范化的类型头（不含泛型参数）
    pub fn canonical_name(&self, ty: &Type) -> Option<String> {
        match self.strip_reference(ty) {
            Type::Path(type_path) if type_path.qself.is_none() => {
                let written = path_text(&type_path.path);
                Some(self.canonicalize(&written))
            }
            Type::Tuple(tuple) if tuple.elems.is_empty() => Some("()".to_string()),
            Type::Slice(_) => Some("[]".to_string()),
            Type::Array(_) => Some("[;]".to_string()),
            _ => None,
        }
    }

    fn canonicalize(&self, written: &str) -> String {
        self.aliases
            .get(written)
            .map(|canonical| canonical.to_string())
            .unwrap_or_else(|| written.to_string())
    }

    /// 解析比较：类型头和所有类型参数都相同
    pub fn is_same_type(&self, ty: &Type, target: &str) -> bool {
        match syn::parse_str::<Type>(target) {
            Ok(target) => self.types_equal(ty, &target),
            Err(_) => false,
        }
    }

    pub fn types_equal(&self, left: &Type, right: &Type) -> bool {
        let left = self.strip_reference(left);
        let right = self.strip_reference(right);
        match (left, right) {
            (Type::Slice(a), Type::Slice(b)) => self.types_equal(&a.elem, &b.elem),
            (Type::Array(a), Type::Array(b)) => self.types_equal(&a.elem, &b.elem),
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.elems.len() == b.elems.len()
                    && a.elems.iter().zip(b.elems.iter()).all(|(x, y)| self.types_equal(x, y))
            }
            (Type::Path(_), Type::Path(_)) => {
                if self.canonical_name(left) != self.canonical_name(right) {
                    return false;
                }
                let left_args = type_arguments(left);
                let right_args = type_arguments(right);
                left_args.len() == right_args.len()
                    && left_args
                        .iter()
                        .zip(right_args.iter())
                        .all(|(x, y)| self.types_equal(x, y))
            }
            _ => false,
        }
    }

    /// 名称比较：只比较最后一段路径的标识符
    pub fn is_same_type_by_name(&self, ty: &Type, simple_name: &str) -> bool {
        match self.strip_reference(ty) {
            Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == simple_name),
            _ => false,
        }
    }

    /// 泛型擦除后比较
    pub fn erasure_equals(&self, ty: &Type, target: &str) -> bool {
        match syn::parse_str::<Type>(target) {
            Ok(target) => {
                let canonical = self.canonical_name(&target);
                canonical.is_some() && self.canonical_name(ty) == canonical
            }
            Err(_) => false,
        }
    }

    pub fn is_subtype(&self, ty: &Type, class: TypeClass) -> bool {
        let ty = self.strip_reference(ty);
        let canonical = self.canonical_name(ty);
        let canonical = canonical.as_deref();
        match class {
            TypeClass::Str => match canonical {
                Some(name) if STR_CLASS.contains(&name) => true,
                Some(name) if STR_WRAPPERS.contains(&name) => self
                    .generic_argument(ty, 0)
                    .is_some_and(|inner| self.canonical_name(inner).as_deref() == Some("str")),
                _ => false,
            },
            TypeClass::Map => canonical.is_some_and(|name| MAP_CLASS.contains(&name)),
            TypeClass::Sequence => match ty {
                Type::Slice(_) | Type::Array(_) => true,
                _ => canonical.is_some_and(|name| SEQUENCE_CLASS.contains(&name)),
            },
            TypeClass::Bytes => {
                canonical == Some("bytes::Bytes")
                    || (self.is_array_of(ty, "u8") && !self.erasure_equals(ty, "VecDeque"))
            }
            TypeClass::Unit => canonical == Some("()"),
        }
    }

    /// 元素类型为 `element` 的数组、切片或 `Vec`
    pub fn is_array_of(&self, ty: &Type, element: &str) -> bool {
        self.element_type(ty)
            .is_some_and(|elem| self.is_same_type(elem, element))
    }

    /// 序列的元素类型
    pub fn element_type<'a>(&self, ty: &'a Type) -> Option<&'a Type> {
        match self.strip_reference(ty) {
            Type::Slice(slice) => Some(&slice.elem),
            Type::Array(array) => Some(&array.elem),
            stripped @ Type::Path(_) if self.is_subtype(stripped, TypeClass::Sequence) => {
                self.generic_argument(stripped, 0)
            }
            _ => None,
        }
    }

    /// 第 `index` 个尖括号类型参数（生命周期和常量不计）
    pub fn generic_argument<'a>(&self, ty: &'a Type, index: usize) -> Option<&'a Type> {
        type_arguments(self.strip_reference(ty)).into_iter().nth(index)
    }

    pub fn first_generic_argument<'a>(&self, ty: &'a Type) -> Option<&'a Type> {
        self.generic_argument(ty, 0)
    }

    pub fn second_generic_argument<'a>(&self, ty: &'a Type) -> Option<&'a Type> {
        self.generic_argument(ty, 1)
    }

    /// `impl Bound<T>` 或 `Box<dyn Bound<T>>` 中 `Bound` 的第 `index` 个类型参数
    pub fn bound_argument<'a>(&self, ty: &'a Type, bound: &str, index: usize) -> Option<&'a Type> {
        let bounds = match self.strip_reference(ty) {
            Type::ImplTrait(impl_trait) => &impl_trait.bounds,
            Type::TraitObject(object) => &object.bounds,
            stripped @ Type::Path(_) if self.erasure_equals(stripped, "Box") => {
                return self
                    .generic_argument(stripped, 0)
                    .and_then(|inner| match inner {
                        Type::TraitObject(_) => self.bound_argument(inner, bound, index),
                        _ => None,
                    });
            }
            _ => return None,
        };
        bounds.iter().find_map(|candidate| match candidate {
            TypeParamBound::Trait(trait_bound) => {
                let segment = trait_bound.path.segments.last()?;
                if segment.ident != bound {
                    return None;
                }
                match &segment.arguments {
                    PathArguments::AngleBracketed(args) => args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(ty) => Some(ty),
                            _ => None,
                        })
                        .nth(index),
                    _ => None,
                }
            }
            _ => None,
        })
    }

    pub fn is_impl_trait(&self, ty: &Type) -> bool {
        matches!(self.strip_reference(ty), Type::ImplTrait(_))
    }
}

fn path_text(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

fn type_arguments(ty: &Type) -> Vec<&Type> {
    match ty {
        Type::Path(type_path) => match type_path.path.segments.last().map(|s| &s.arguments) {
            Some(PathArguments::AngleBracketed(args)) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
