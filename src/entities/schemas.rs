//! Request bodies and their validation.
//!
//! Bodies are deserialized into DTOs, checked with `validator` plus a few
//! checks it cannot express, and reported as `(field, code)` violations. The
//! entity's rule table turns the first matching violation into the message.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{Rule, Schema};
use crate::auth::Rol;
use crate::config::messages;
use crate::database::Document;
use crate::error::ApiError;

pub const ESTADOS: [&str; 4] = ["ENTREGADO", "FACTURADO", "PEDIDO", "PREPARADO"];
pub const ESTADO_INICIAL: &str = "PEDIDO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub code: &'static str,
}

impl Violation {
    fn new(field: impl Into<String>, code: &'static str) -> Self {
        Self { field: field.into(), code }
    }
}

/// A request body with checks beyond what the derive covers.
pub trait RequestBody: DeserializeOwned + Validate {
    fn extra_violations(&self) -> Vec<Violation> {
        vec![]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NombreRequest {
    #[validate(required, length(min = 3, max = 50))]
    pub nombre: Option<String>,
    pub activo: Option<bool>,
}

impl RequestBody for NombreRequest {}

#[derive(Debug, Deserialize, Validate)]
pub struct PedidoRequest {
    #[validate(required)]
    pub cliente: Option<String>,
    #[validate(required)]
    pub producto: Option<String>,
    #[validate(required)]
    pub proveedor: Option<String>,
    pub modelo: Option<String>,
    pub referencia: Option<String>,
    #[validate(required, range(min = 1))]
    pub unidades: Option<i64>,
    pub oferta: Option<String>,
    pub numero_serie: Option<String>,
    pub observaciones: Option<String>,
    pub parte: Option<i64>,
    pub estado: Option<String>,
}

impl RequestBody for PedidoRequest {
    fn extra_violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        for (field, value) in [("cliente", &self.cliente), ("producto", &self.producto), ("proveedor", &self.proveedor)] {
            if let Some(id) = value {
                if Uuid::parse_str(id.trim()).is_err() {
                    out.push(Violation::new(field, "formato"));
                }
            }
        }
        if let Some(estado) = &self.estado {
            if !ESTADOS.contains(&estado.trim()) {
                out.push(Violation::new("estado", "enum"));
            }
        }
        out
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UsuarioRequest {
    #[validate(required, length(min = 3, max = 50))]
    pub nombre: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 3, max = 50))]
    pub password: Option<String>,
    #[validate(required)]
    pub rol: Option<String>,
}

impl RequestBody for UsuarioRequest {
    fn extra_violations(&self) -> Vec<Violation> {
        match self.rol.as_deref() {
            Some(rol) if Rol::parse(rol.trim()).is_none() => vec![Violation::new("rol", "enum")],
            _ => vec![],
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 3, max = 50))]
    pub password: Option<String>,
}

impl RequestBody for LoginRequest {}

pub static LOGIN_RULES: &[Rule] = &[
    Rule { field: "password", code: "requerido", message: messages::USUARIO_PASSWORD_REQUERIDO },
    Rule { field: "password", code: "corto", message: messages::USUARIO_PASSWORD_CORTO },
    Rule { field: "password", code: "largo", message: messages::USUARIO_PASSWORD_LARGO },
    Rule { field: "email", code: "requerido", message: messages::USUARIO_EMAIL_REQUERIDO },
    Rule { field: "email", code: "formato", message: messages::USUARIO_EMAIL_FORMATO_NO_VALIDO },
];

/// Translate `validator` errors into violation codes.
fn violations_from(errors: &ValidationErrors) -> Vec<Violation> {
    let mut out = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            let code = match &*error.code {
                "required" => "requerido",
                "email" => "formato",
                "range" => "rango",
                "length" => {
                    let min = error.params.get("min").and_then(Value::as_u64);
                    let len = error
                        .params
                        .get("value")
                        .and_then(Value::as_str)
                        .map(|v| v.chars().count() as u64);
                    match (min, len) {
                        (Some(min), Some(len)) if len < min => "corto",
                        _ => "largo",
                    }
                }
                _ => "formato",
            };
            out.push(Violation::new(field.to_string(), code));
        }
    }
    out
}

/// Collect violations and resolve them against the rule table.
pub fn check(violations: &[Violation], rules: &[Rule]) -> Result<(), ApiError> {
    if violations.is_empty() {
        return Ok(());
    }
    let hit = |rule: &&Rule| violations.iter().any(|v| v.field == rule.field && v.code == rule.code);

    let mut field_errors = BTreeMap::new();
    for rule in rules.iter().filter(hit) {
        field_errors.entry(rule.field.to_string()).or_insert_with(|| rule.message.to_string());
    }
    let message = rules
        .iter()
        .find(hit)
        .map(|rule| rule.message)
        .unwrap_or(messages::PETICION_NO_VALIDA);
    Err(ApiError::validation_error(message, Some(field_errors)))
}

/// Deserialize and validate a body. Requirement violations are dropped in
/// update mode when `partial` is set.
pub fn parse_body<T: RequestBody>(body: Value, rules: &[Rule], mode: Mode, partial: bool) -> Result<T, ApiError> {
    let request: T = serde_json::from_value(body).map_err(|e| {
        tracing::debug!("Body does not match schema: {}", e);
        ApiError::invalid_json(messages::PETICION_NO_VALIDA)
    })?;

    let mut violations = match request.validate() {
        Ok(()) => vec![],
        Err(errors) => violations_from(&errors),
    };
    violations.extend(request.extra_violations());
    if mode == Mode::Update && partial {
        violations.retain(|v| v.code != "requerido");
    }
    check(&violations, rules)?;
    Ok(request)
}

/// Trim string values in place; empty strings after trimming become absent.
fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn put(document: &mut Document, field: &str, value: Option<Value>) {
    if let Some(value) = value {
        document.insert(field.to_string(), value);
    }
}

/// Validate `body` against the entity schema and build the document to store.
///
/// Create mode fills defaults (`activo: true`, `estado: PEDIDO`); update mode
/// only carries the fields present in the body. Passwords are stored as given
/// here; hashing is the caller's concern.
pub fn build(schema: Schema, body: Value, mode: Mode, rules: &[Rule]) -> Result<Document, ApiError> {
    let body = normalize(body);
    let mut document = Map::new();
    match schema {
        Schema::Nombre { activo } => {
            let request: NombreRequest = parse_body(body, rules, mode, false)?;
            put(&mut document, "nombre", trimmed(request.nombre).map(Value::from));
            if activo {
                let flag = match (request.activo, mode) {
                    (Some(flag), _) => Some(flag),
                    (None, Mode::Create) => Some(true),
                    (None, Mode::Update) => None,
                };
                put(&mut document, "activo", flag.map(Value::from));
            }
        }
        Schema::Pedido => {
            let request: PedidoRequest = parse_body(body, rules, mode, true)?;
            put(&mut document, "cliente", trimmed(request.cliente).map(Value::from));
            put(&mut document, "producto", trimmed(request.producto).map(Value::from));
            put(&mut document, "proveedor", trimmed(request.proveedor).map(Value::from));
            put(&mut document, "modelo", trimmed(request.modelo).map(Value::from));
            put(&mut document, "referencia", trimmed(request.referencia).map(Value::from));
            put(&mut document, "unidades", request.unidades.map(Value::from));
            put(&mut document, "oferta", trimmed(request.oferta).map(Value::from));
            put(&mut document, "numero_serie", trimmed(request.numero_serie).map(Value::from));
            put(&mut document, "observaciones", trimmed(request.observaciones).map(Value::from));
            put(&mut document, "parte", request.parte.map(Value::from));
            let estado = match (trimmed(request.estado), mode) {
                (Some(estado), _) => Some(estado),
                (None, Mode::Create) => Some(ESTADO_INICIAL.to_string()),
                (None, Mode::Update) => None,
            };
            put(&mut document, "estado", estado.map(Value::from));
        }
        Schema::Usuario => {
            let request: UsuarioRequest = parse_body(body, rules, mode, false)?;
            put(&mut document, "nombre", trimmed(request.nombre).map(Value::from));
            put(&mut document, "email", trimmed(request.email).map(|e| Value::from(e.to_lowercase())));
            put(&mut document, "password", request.password.map(Value::from));
            put(&mut document, "rol", trimmed(request.rol).map(Value::from));
        }
    }
    Ok(document)
}

/// Trim top-level strings so length limits apply to the stored value.
fn normalize(body: Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| match v {
                    Value::String(s) if k != "password" => (k, Value::String(s.trim().to_string())),
                    other => (k, other),
                })
                .collect(),
        ),
        other => other,
    }
}
