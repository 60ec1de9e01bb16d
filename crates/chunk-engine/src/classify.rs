//! Definition classification.
//!
//! Decorators are matched declaratively as [`DecoratorMarker`] variants and
//! the body is scanned once for suspension points and yields. The kind is then
//! picked by a fixed precedence list, first match wins:
//!
//! | # | Condition                                                 | Kind             |
//! |---|-----------------------------------------------------------|------------------|
//! | 1 | `@<prop>.setter` / `.deleter` on a known property          | `PropertySetter` |
//! | 2 | `@property` (or `@<prop>.getter` on a known property)     | `Property`       |
//! | 3 | `@staticmethod`                                           | `StaticMethod`   |
//! | 4 | `@classmethod`                                            | `ClassMethod`    |
//! | 5 | `async def` with an `await`/`async for`/`async with`      | `AsyncFunction`  |
//! | 6 | body contains `yield`                                     | `Generator`      |
//! | 7 | directly in a class body                                  | `Method`         |
//! | 8 | anything else introduced by `def`                         | `Function`       |
//! | - | `class`                                                   | `Class`          |

use crate::types::ChunkKind;
use tree_sitter::Node;

/// Syntactic shape of a definition node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionShape {
    Function,
    Class,
}

impl DefinitionShape {
    /// Map a tree-sitter node kind to a definition shape
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "function_definition" => Some(Self::Function),
            "class_definition" => Some(Self::Class),
            _ => None,
        }
    }

    /// Node kinds that look like definitions but are not recognised
    pub fn is_unsupported_definition(kind: &str) -> bool {
        kind.ends_with("_definition")
            && kind != "decorated_definition"
            && Self::from_node_kind(kind).is_none()
    }
}

/// Accessor declared through `@<prop>.<accessor>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Getter,
    Setter,
    Deleter,
}

/// What a decorator means to the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorMarker {
    Property,
    Accessor { property: String, accessor: Accessor },
    StaticMethod,
    ClassMethod,
    Other,
}

impl DecoratorMarker {
    /// Interpret a decorator expression (without the leading '@')
    pub fn parse(decorator: &str) -> Self {
        // `functools.wraps(func)` is identified by the callee
        let callee = decorator.split('(').next().unwrap_or(decorator).trim();
        let (owner, last) = match callee.rsplit_once('.') {
            Some((owner, last)) => (Some(owner.trim()), last.trim()),
            None => (None, callee),
        };

        match (owner, last) {
            (_, "property" | "cached_property" | "abstractproperty") => Self::Property,
            (_, "staticmethod") => Self::StaticMethod,
            (_, "classmethod") => Self::ClassMethod,
            (Some(owner), "setter" | "getter" | "deleter") if is_identifier(owner) => {
                let accessor = match last {
                    "setter" => Accessor::Setter,
                    "getter" => Accessor::Getter,
                    _ => Accessor::Deleter,
                };
                Self::Accessor {
                    property: owner.to_string(),
                    accessor,
                }
            }
            _ => Self::Other,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Suspension points and yields found in a routine body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyMarkers {
    pub awaits: bool,
    pub yields: bool,
}

impl BodyMarkers {
    /// Scan a body in one pass without entering nested scopes.
    ///
    /// A `yield` inside a nested `def`, `class` or `lambda` belongs to that
    /// scope and does not make the enclosing routine a generator.
    pub fn scan(body: Node) -> Self {
        let mut markers = Self::default();
        let mut stack = vec![body];

        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_definition" | "class_definition" | "decorated_definition" | "lambda"
                    if node != body =>
                {
                    continue;
                }
                "await" => markers.awaits = true,
                "yield" => markers.yields = true,
                "with_statement" | "for_statement" | "for_in_clause" if starts_with_async(node) => {
                    markers.awaits = true;
                }
                _ => {}
            }

            if markers.awaits && markers.yields {
                break;
            }

            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }

        markers
    }
}

fn starts_with_async(node: Node) -> bool {
    node.child(0).is_some_and(|first| first.kind() == "async")
}

/// Facts the classifier needs about one definition
#[derive(Debug, Clone)]
pub struct DefinitionFacts<'a> {
    pub shape: DefinitionShape,
    pub is_async: bool,
    pub decorators: &'a [DecoratorMarker],
    pub body: BodyMarkers,
    /// Kind of the enclosing definition, None at module level
    pub parent: Option<ChunkKind>,
    /// Properties already declared in the enclosing class
    pub known_properties: &'a [String],
}

/// Assign exactly one kind to a definition
pub fn classify(facts: &DefinitionFacts) -> ChunkKind {
    if facts.shape == DefinitionShape::Class {
        return ChunkKind::Class;
    }

    let accessor = |wanted: &[Accessor]| {
        facts.decorators.iter().any(|marker| match marker {
            DecoratorMarker::Accessor {
                property,
                accessor: kind,
            } => wanted.contains(kind) && facts.known_properties.contains(property),
            _ => false,
        })
    };
    let has = |wanted: &DecoratorMarker| facts.decorators.contains(wanted);

    if accessor(&[Accessor::Setter, Accessor::Deleter]) {
        ChunkKind::PropertySetter
    } else if has(&DecoratorMarker::Property) || accessor(&[Accessor::Getter]) {
        ChunkKind::Property
    } else if has(&DecoratorMarker::StaticMethod) {
        ChunkKind::StaticMethod
    } else if has(&DecoratorMarker::ClassMethod) {
        ChunkKind::ClassMethod
    } else if facts.is_async && facts.body.awaits {
        ChunkKind::AsyncFunction
    } else if facts.body.yields {
        ChunkKind::Generator
    } else if facts.parent == Some(ChunkKind::Class) {
        ChunkKind::Method
    } else {
        ChunkKind::Function
    }
}

/// Whether the definition node carries the `async` qualifier
pub fn is_async_definition(definition: Node) -> bool {
    starts_with_async(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn facts<'a>(
        decorators: &'a [DecoratorMarker],
        known_properties: &'a [String],
    ) -> DefinitionFacts<'a> {
        DefinitionFacts {
            shape: DefinitionShape::Function,
            is_async: false,
            decorators,
            body: BodyMarkers::default(),
            parent: Some(ChunkKind::Class),
            known_properties,
        }
    }

    fn markers_of(code: &str) -> BodyMarkers {
        let tree = Language::Python.parse(code).unwrap();
        let body = tree
            .root_node()
            .named_child(0)
            .and_then(|def| def.child_by_field_name("body"))
            .unwrap();
        BodyMarkers::scan(body)
    }

    #[test]
    fn test_decorator_marker_parse() {
        assert_eq!(DecoratorMarker::parse("property"), DecoratorMarker::Property);
        assert_eq!(
            DecoratorMarker::parse("functools.cached_property"),
            DecoratorMarker::Property
        );
        assert_eq!(DecoratorMarker::parse("staticmethod"), DecoratorMarker::StaticMethod);
        assert_eq!(DecoratorMarker::parse("classmethod"), DecoratorMarker::ClassMethod);
        assert_eq!(
            DecoratorMarker::parse("total_calculations.setter"),
            DecoratorMarker::Accessor {
                property: "total_calculations".to_string(),
                accessor: Accessor::Setter,
            }
        );
        assert_eq!(DecoratorMarker::parse("functools.wraps(func)"), DecoratorMarker::Other);
        assert_eq!(DecoratorMarker::parse("app.route('/x')"), DecoratorMarker::Other);
        assert_eq!(DecoratorMarker::parse("a.b.setter"), DecoratorMarker::Other);
    }

    #[test]
    fn test_setter_requires_known_property() {
        let markers = [DecoratorMarker::parse("value.setter")];
        let known = vec!["value".to_string()];
        assert_eq!(classify(&facts(&markers, &known)), ChunkKind::PropertySetter);
        assert_eq!(classify(&facts(&markers, &[])), ChunkKind::Method);
    }

    #[test]
    fn test_deleter_and_getter_accessors() {
        let known = vec!["value".to_string()];
        let deleter = [DecoratorMarker::parse("value.deleter")];
        let getter = [DecoratorMarker::parse("value.getter")];
        assert_eq!(classify(&facts(&deleter, &known)), ChunkKind::PropertySetter);
        assert_eq!(classify(&facts(&getter, &known)), ChunkKind::Property);
    }

    #[test]
    fn test_property_wins_over_yield() {
        let markers = [DecoratorMarker::Property];
        let known: Vec<String> = Vec::new();
        let mut f = facts(&markers, &known);
        f.body.yields = true;
        assert_eq!(classify(&f), ChunkKind::Property);
    }

    #[test]
    fn test_marker_precedence() {
        let both = [DecoratorMarker::ClassMethod, DecoratorMarker::Property];
        assert_eq!(classify(&facts(&both, &[])), ChunkKind::Property);

        let static_and_class = [DecoratorMarker::ClassMethod, DecoratorMarker::StaticMethod];
        assert_eq!(classify(&facts(&static_and_class, &[])), ChunkKind::StaticMethod);

        let static_only = [DecoratorMarker::StaticMethod];
        let known: Vec<String> = Vec::new();
        let mut f = facts(&static_only, &known);
        f.is_async = true;
        f.body.awaits = true;
        assert_eq!(classify(&f), ChunkKind::StaticMethod);
    }

    #[test]
    fn test_async_and_generator() {
        let markers: Vec<DecoratorMarker> = Vec::new();
        let known: Vec<String> = Vec::new();
        let mut f = facts(&markers, &known);
        f.parent = None;
        f.is_async = true;
        f.body = BodyMarkers {
            awaits: true,
            yields: true,
        };
        assert_eq!(classify(&f), ChunkKind::AsyncFunction);

        f.body.awaits = false;
        assert_eq!(classify(&f), ChunkKind::Generator);

        f.body.yields = false;
        assert_eq!(classify(&f), ChunkKind::Function);
    }

    #[test]
    fn test_method_and_function() {
        let markers: Vec<DecoratorMarker> = Vec::new();
        let known: Vec<String> = Vec::new();
        assert_eq!(classify(&facts(&markers, &known)), ChunkKind::Method);

        let mut nested = facts(&markers, &known);
        nested.parent = Some(ChunkKind::Method);
        assert_eq!(classify(&nested), ChunkKind::Function);

        let mut class = facts(&markers, &known);
        class.shape = DefinitionShape::Class;
        class.body.yields = true;
        assert_eq!(classify(&class), ChunkKind::Class);
    }

    #[test]
    fn test_scan_finds_nested_await() {
        let markers = markers_of(
            "async def f(url):\n    async with session() as s:\n        return await s.get(url)\n",
        );
        assert!(markers.awaits);
        assert!(!markers.yields);
    }

    #[test]
    fn test_scan_async_for_is_suspension_point() {
        let markers = markers_of("async def f(xs):\n    async for x in xs:\n        print(x)\n");
        assert!(markers.awaits);
    }

    #[test]
    fn test_scan_ignores_nested_scopes() {
        let markers = markers_of(
            "def outer():\n    def inner():\n        yield 1\n    g = lambda: (yield)\n    return inner\n",
        );
        assert_eq!(markers, BodyMarkers::default());
    }

    #[test]
    fn test_scan_yield_from() {
        let markers = markers_of("def f():\n    yield from range(3)\n");
        assert!(markers.yields);
    }

    #[test]
    fn test_unsupported_definition_kinds() {
        assert!(DefinitionShape::is_unsupported_definition("struct_definition"));
        assert!(!DefinitionShape::is_unsupported_definition("function_definition"));
        assert!(!DefinitionShape::is_unsupported_definition("decorated_definition"));
        assert!(!DefinitionShape::is_unsupported_definition("expression_statement"));
    }
}
