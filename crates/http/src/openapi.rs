//! OpenAPI document assembly.
//!
//! Modules describe themselves with plain JSON fragments; the helpers here keep
//! those fragments short and the merge step produces one document.

use savanna_kernel::ModuleRegistry;
use serde_json::{json, Value};

pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

pub fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": schema_ref(name) })
}

/// `application/json` response with the given schema.
pub fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

pub fn error_response(description: &str) -> Value {
    json_response(description, schema_ref("ErrorResponse"))
}

/// `application/json` request body referencing a named schema.
pub fn json_body(name: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(name) } }
    })
}

pub fn id_param(name: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

pub fn query_param(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": "string" }
    })
}

/// Collect every module fragment into a single OpenAPI 3 document
pub fn document(registry: &ModuleRegistry) -> Value {
    let mut spec = json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Savanna API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Safari tour operator site and back office"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    spec["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": {} },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                // Several modules may contribute methods to the same path.
                let target = &mut spec["paths"][path.as_str()];
                if target.is_object() {
                    if let (Some(existing), Some(methods)) = (target.as_object_mut(), item.as_object()) {
                        for (method, operation) in methods {
                            existing.insert(method.clone(), operation.clone());
                        }
                    }
                } else {
                    *target = item.clone();
                }
            }
        }

        if let Some(schemas) = fragment
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                spec["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use savanna_kernel::Module;
    use std::sync::Arc;

    struct FragmentModule(&'static str, Value);

    impl Module for FragmentModule {
        fn name(&self) -> &'static str {
            self.0
        }

        fn openapi(&self) -> Option<Value> {
            Some(self.1.clone())
        }
    }

    #[test]
    fn merges_paths_and_schemas() {
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(FragmentModule(
            "reviews",
            json!({
                "paths": { "/api/reviews/featured": { "get": { "summary": "Featured" } } },
                "components": { "schemas": { "Review": { "type": "object" } } }
            }),
        )));
        registry.register_custom(Arc::new(FragmentModule(
            "reviews_admin",
            json!({
                "paths": { "/api/reviews/featured": { "head": { "summary": "Probe" } } }
            }),
        )));

        let doc = document(&registry);
        assert_eq!(doc["openapi"], "3.0.0");
        assert!(doc["paths"]["/healthz"]["get"].is_object());
        assert_eq!(doc["paths"]["/api/reviews/featured"]["get"]["summary"], "Featured");
        assert_eq!(doc["paths"]["/api/reviews/featured"]["head"]["summary"], "Probe");
        assert!(doc["components"]["schemas"]["Review"].is_object());
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    }

    #[test]
    fn helpers_reference_component_schemas() {
        assert_eq!(
            array_of("Destination")["items"]["$ref"],
            "#/components/schemas/Destination"
        );
        assert_eq!(id_param("id")["in"], "path");
    }
}
