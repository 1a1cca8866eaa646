//! Per-entity configuration driving the generic resource handlers.

pub mod schemas;

use crate::auth::Rol;
use crate::config::messages as msg;

/// Which request body schema an entity accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// `{nombre}` master data, optionally with an `activo` flag.
    Nombre { activo: bool },
    Pedido,
    Usuario,
}

/// A field holding the identifier of a document in another collection.
#[derive(Debug)]
pub struct Reference {
    pub field: &'static str,
    pub collection: &'static str,
}

#[derive(Debug)]
pub struct EntityMessages {
    pub not_found: &'static str,
    pub already_exists: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: Option<&'static str>,
}

/// Message for a failed validation check on `field`. Earlier rules win.
#[derive(Debug)]
pub struct Rule {
    pub field: &'static str,
    pub code: &'static str,
    pub message: &'static str,
}

/// Roles allowed per operation. `delete: None` means the entity is never deleted.
#[derive(Debug)]
pub struct Access {
    pub read: &'static [Rol],
    pub write: &'static [Rol],
    pub delete: Option<&'static [Rol]>,
}

#[derive(Debug)]
pub struct EntitySpec {
    pub path: &'static str,
    pub collection: &'static str,
    pub unique_field: Option<&'static str>,
    pub schema: Schema,
    pub references: &'static [Reference],
    pub hidden: &'static [&'static str],
    pub messages: EntityMessages,
    pub rules: &'static [Rule],
    pub access: Access,
}

const fn rule(field: &'static str, code: &'static str, message: &'static str) -> Rule {
    Rule { field, code, message }
}

pub static CLIENTES: EntitySpec = EntitySpec {
    path: "clientes",
    collection: "clientes",
    unique_field: Some("nombre"),
    schema: Schema::Nombre { activo: true },
    references: &[],
    hidden: &[],
    messages: EntityMessages {
        not_found: msg::CLIENTE_NO_ENCONTRADO,
        already_exists: msg::CLIENTE_YA_EXISTE,
        created: msg::CLIENTE_REGISTRADO,
        updated: msg::CLIENTE_ACTUALIZADO,
        deleted: None,
    },
    rules: &[
        rule("nombre", "requerido", msg::CLIENTE_NOMBRE_REQUERIDO),
        rule("nombre", "corto", msg::CLIENTE_NOMBRE_CORTO),
        rule("nombre", "largo", msg::CLIENTE_NOMBRE_LARGO),
    ],
    access: Access { read: Rol::ALL, write: Rol::ALL, delete: None },
};

pub static PROVEEDORES: EntitySpec = EntitySpec {
    path: "proveedores",
    collection: "proveedores",
    unique_field: Some("nombre"),
    schema: Schema::Nombre { activo: true },
    references: &[],
    hidden: &[],
    messages: EntityMessages {
        not_found: msg::PROVEEDOR_NO_ENCONTRADO,
        already_exists: msg::PROVEEDOR_YA_EXISTE,
        created: msg::PROVEEDOR_REGISTRADO,
        updated: msg::PROVEEDOR_ACTUALIZADO,
        deleted: None,
    },
    rules: &[
        rule("nombre", "requerido", msg::PROVEEDOR_NOMBRE_REQUERIDO),
        rule("nombre", "corto", msg::PROVEEDOR_NOMBRE_CORTO),
        rule("nombre", "largo", msg::PROVEEDOR_NOMBRE_LARGO),
    ],
    access: Access { read: Rol::ALL, write: Rol::ALL, delete: None },
};

pub static PRODUCTOS: EntitySpec = EntitySpec {
    path: "productos",
    collection: "productos",
    unique_field: Some("nombre"),
    schema: Schema::Nombre { activo: false },
    references: &[],
    hidden: &[],
    messages: EntityMessages {
        not_found: msg::PRODUCTO_NO_ENCONTRADO,
        already_exists: msg::PRODUCTO_YA_EXISTE,
        created: msg::PRODUCTO_REGISTRADO,
        updated: msg::PRODUCTO_ACTUALIZADO,
        deleted: None,
    },
    rules: &[
        rule("nombre", "requerido", msg::PRODUCTO_NOMBRE_REQUERIDO),
        rule("nombre", "corto", msg::PRODUCTO_NOMBRE_CORTO),
        rule("nombre", "largo", msg::PRODUCTO_NOMBRE_LARGO),
    ],
    access: Access { read: Rol::ALL, write: Rol::ALL, delete: None },
};

pub static PEDIDOS: EntitySpec = EntitySpec {
    path: "pedidos",
    collection: "pedidos",
    unique_field: None,
    schema: Schema::Pedido,
    references: &[
        Reference { field: "cliente", collection: "clientes" },
        Reference { field: "producto", collection: "productos" },
        Reference { field: "proveedor", collection: "proveedores" },
    ],
    hidden: &[],
    messages: EntityMessages {
        not_found: msg::PEDIDO_NO_ENCONTRADO,
        already_exists: msg::ERROR_GENERAL,
        created: msg::PEDIDO_REGISTRADO,
        updated: msg::PEDIDO_ACTUALIZADO,
        deleted: Some(msg::PEDIDO_BORRADO),
    },
    rules: &[
        rule("cliente", "requerido", msg::PEDIDO_CLIENTE_REQUERIDO),
        rule("cliente", "formato", msg::PEDIDO_CLIENTE_NO_VALIDO),
        rule("producto", "requerido", msg::PEDIDO_PRODUCTO_REQUERIDO),
        rule("producto", "formato", msg::PEDIDO_PRODUCTO_NO_VALIDO),
        rule("proveedor", "requerido", msg::PEDIDO_PROVEEDOR_REQUERIDO),
        rule("proveedor", "formato", msg::PEDIDO_PROVEEDOR_NO_VALIDO),
        rule("unidades", "requerido", msg::PEDIDO_UNIDADES_REQUERIDAS),
        rule("unidades", "rango", msg::PEDIDO_UNIDADES_NO_VALIDAS),
        rule("estado", "enum", msg::PEDIDO_ESTADO_NO_VALIDO),
    ],
    access: Access { read: Rol::ALL, write: Rol::ALL, delete: Some(Rol::ADMIN_ONLY) },
};

pub static USUARIOS: EntitySpec = EntitySpec {
    path: "usuarios",
    collection: "usuarios",
    unique_field: Some("email"),
    schema: Schema::Usuario,
    references: &[],
    hidden: &["password"],
    messages: EntityMessages {
        not_found: msg::USUARIO_NO_ENCONTRADO,
        already_exists: msg::USUARIO_YA_EXISTE,
        created: msg::USUARIO_REGISTRADO,
        updated: msg::USUARIO_ACTUALIZADO,
        deleted: Some(msg::USUARIO_BORRADO),
    },
    rules: &[
        rule("nombre", "requerido", msg::USUARIO_NOMBRE_REQUERIDO),
        rule("nombre", "corto", msg::USUARIO_NOMBRE_CORTO),
        rule("nombre", "largo", msg::USUARIO_NOMBRE_LARGO),
        rule("password", "requerido", msg::USUARIO_PASSWORD_REQUERIDO),
        rule("password", "corto", msg::USUARIO_PASSWORD_CORTO),
        rule("password", "largo", msg::USUARIO_PASSWORD_LARGO),
        rule("email", "requerido", msg::USUARIO_EMAIL_REQUERIDO),
        rule("email", "formato", msg::USUARIO_EMAIL_FORMATO_NO_VALIDO),
        rule("rol", "requerido", msg::USUARIO_ROL_REQUERIDO),
        rule("rol", "enum", msg::USUARIO_ROL_NO_VALIDO),
    ],
    access: Access { read: Rol::ADMIN_ONLY, write: Rol::ADMIN_ONLY, delete: Some(Rol::ADMIN_ONLY) },
};

pub static ENTITIES: [&EntitySpec; 5] = [&CLIENTES, &PROVEEDORES, &PRODUCTOS, &PEDIDOS, &USUARIOS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_orders_and_users_are_deletable() {
        let deletable: Vec<&str> = ENTITIES.iter().filter(|e| e.access.delete.is_some()).map(|e| e.path).collect();
        assert_eq!(deletable, vec!["pedidos", "usuarios"]);
    }

    #[test]
    fn password_is_hidden_for_users() {
        assert_eq!(USUARIOS.hidden, &["password"]);
        assert_eq!(USUARIOS.unique_field, Some("email"));
    }

    #[test]
    fn paths_are_distinct() {
        for (i, a) in ENTITIES.iter().enumerate() {
            for b in &ENTITIES[i + 1..] {
                assert_ne!(a.path, b.path);
            }
        }
    }
}
