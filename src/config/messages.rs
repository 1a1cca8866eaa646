// User-facing messages. The API speaks Spanish, as its clients do.

pub const ERROR_GENERAL: &str = "Se ha producido un error, inténtelo más tarde";
pub const PETICION_NO_VALIDA: &str = "El cuerpo de la petición no es válido";
pub const SERVICIO_NO_DISPONIBLE: &str = "Servicio no disponible";

pub const CLIENTE_NO_ENCONTRADO: &str = "Cliente no encontrado";
pub const CLIENTE_YA_EXISTE: &str = "El cliente ya existe";
pub const CLIENTE_REGISTRADO: &str = "Cliente registrado correctamente";
pub const CLIENTE_ACTUALIZADO: &str = "Cliente actualizado correctamente";
pub const CLIENTE_NOMBRE_REQUERIDO: &str = "El nombre del cliente es obligatorio";
pub const CLIENTE_NOMBRE_CORTO: &str = "El nombre del cliente es demasiado corto";
pub const CLIENTE_NOMBRE_LARGO: &str = "El nombre del cliente es demasiado largo";

pub const PROVEEDOR_NO_ENCONTRADO: &str = "Proveedor no encontrado";
pub const PROVEEDOR_YA_EXISTE: &str = "El proveedor ya existe";
pub const PROVEEDOR_REGISTRADO: &str = "Proveedor registrado correctamente";
pub const PROVEEDOR_ACTUALIZADO: &str = "Proveedor actualizado correctamente";
pub const PROVEEDOR_NOMBRE_REQUERIDO: &str = "El nombre del proveedor es obligatorio";
pub const PROVEEDOR_NOMBRE_CORTO: &str = "El nombre del proveedor es demasiado corto";
pub const PROVEEDOR_NOMBRE_LARGO: &str = "El nombre del proveedor es demasiado largo";

pub const PRODUCTO_NO_ENCONTRADO: &str = "Producto no encontrado";
pub const PRODUCTO_YA_EXISTE: &str = "El producto ya existe";
pub const PRODUCTO_REGISTRADO: &str = "Producto registrado correctamente";
pub const PRODUCTO_ACTUALIZADO: &str = "Producto actualizado correctamente";
pub const PRODUCTO_NOMBRE_REQUERIDO: &str = "El nombre del producto es obligatorio";
pub const PRODUCTO_NOMBRE_CORTO: &str = "El nombre del producto es demasiado corto";
pub const PRODUCTO_NOMBRE_LARGO: &str = "El nombre del producto es demasiado largo";

pub const PEDIDO_NO_ENCONTRADO: &str = "Pedido no encontrado";
pub const PEDIDO_REGISTRADO: &str = "Pedido registrado correctamente";
pub const PEDIDO_ACTUALIZADO: &str = "Pedido actualizado correctamente";
pub const PEDIDO_BORRADO: &str = "Pedido borrado correctamente";
pub const PEDIDO_CLIENTE_REQUERIDO: &str = "El cliente del pedido es obligatorio";
pub const PEDIDO_CLIENTE_NO_VALIDO: &str = "El identificador del cliente no es válido";
pub const PEDIDO_PRODUCTO_REQUERIDO: &str = "El producto del pedido es obligatorio";
pub const PEDIDO_PRODUCTO_NO_VALIDO: &str = "El identificador del producto no es válido";
pub const PEDIDO_PROVEEDOR_REQUERIDO: &str = "El proveedor del pedido es obligatorio";
pub const PEDIDO_PROVEEDOR_NO_VALIDO: &str = "El identificador del proveedor no es válido";
pub const PEDIDO_UNIDADES_REQUERIDAS: &str = "Las unidades del pedido son obligatorias";
pub const PEDIDO_UNIDADES_NO_VALIDAS: &str = "Las unidades del pedido deben ser al menos 1";
pub const PEDIDO_ESTADO_NO_VALIDO: &str = "El estado del pedido no es válido";

pub const USUARIO_NO_ENCONTRADO: &str = "Usuario no encontrado";
pub const USUARIO_YA_EXISTE: &str = "El usuario ya existe";
pub const USUARIO_REGISTRADO: &str = "Usuario registrado correctamente";
pub const USUARIO_ACTUALIZADO: &str = "Usuario actualizado correctamente";
pub const USUARIO_BORRADO: &str = "Usuario borrado correctamente";
pub const USUARIO_CREDENCIALES_INCORRECTAS: &str = "Credenciales incorrectas";
pub const USUARIO_ACCESO_DENEGADO: &str = "Acceso denegado";
pub const USUARIO_NOMBRE_REQUERIDO: &str = "El nombre del usuario es obligatorio";
pub const USUARIO_NOMBRE_CORTO: &str = "El nombre del usuario es demasiado corto";
pub const USUARIO_NOMBRE_LARGO: &str = "El nombre del usuario es demasiado largo";
pub const USUARIO_PASSWORD_REQUERIDO: &str = "La contraseña es obligatoria";
pub const USUARIO_PASSWORD_CORTO: &str = "La contraseña es demasiado corta";
pub const USUARIO_PASSWORD_LARGO: &str = "La contraseña es demasiado larga";
pub const USUARIO_EMAIL_REQUERIDO: &str = "El email es obligatorio";
pub const USUARIO_EMAIL_FORMATO_NO_VALIDO: &str = "El formato del email no es válido";
pub const USUARIO_ROL_REQUERIDO: &str = "El rol es obligatorio";
pub const USUARIO_ROL_NO_VALIDO: &str = "El rol no es válido";
