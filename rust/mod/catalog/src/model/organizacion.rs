use megui_schema::{EntitySchema, FieldDef, Reference};
use serde_json::json;

/// Empresa: legal entity owning vessels, staff and accounts.
pub fn empresas() -> EntitySchema {
    EntitySchema::new("empresa", "Empresas", "empresas")
        .alias("compania")
        .field(FieldDef::text("razonSocial", "Razón social").required().searchable().max_len(150))
        .field(FieldDef::upper("ruc", "RUC").required().searchable().max_len(13))
        .field(FieldDef::text("direccion", "Dirección").max_len(250))
        .field(FieldDef::text("telefono", "Teléfono").max_len(30))
        .field(FieldDef::boolean("activo", "Activo").default_value(json!(true)))
        .audited()
        .display_field("razonSocial")
}

pub fn monedas() -> EntitySchema {
    EntitySchema::new("moneda", "Monedas", "monedas")
        .field(FieldDef::upper("codigo", "Código").required().searchable().max_len(3))
        .field(FieldDef::text("nombre", "Nombre").required().searchable().max_len(60))
        .field(FieldDef::text("simbolo", "Símbolo").max_len(5))
        .display_field("codigo")
}

/// Cargo: job position within a company (Capitán, Motorista, ...). The
/// name is unique per company.
pub fn cargos() -> EntitySchema {
    EntitySchema::new("cargo", "Cargos", "cargos")
        .field(FieldDef::text("nombre", "Nombre").required().searchable().max_len(80))
        .field(FieldDef::text("descripcion", "Descripción").max_len(250))
        .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required().searchable())
        .field(FieldDef::boolean("activo", "Activo").default_value(json!(true)))
        .audited()
        .unique("nombre", &["empresaId"], "validar-nombre", "Ya existe un cargo con ese nombre en la empresa")
        .reference(Reference::new("empresas", "empresas", "razonSocial"))
}

/// Personal: staff records. Crew members are drawn from here.
pub fn personal() -> EntitySchema {
    EntitySchema::new("personal", "Personal", "personal")
        .alias("persona")
        .alias("empleado")
        .field(FieldDef::text("nombres", "Nombres").required().searchable().max_len(100))
        .field(FieldDef::text("apellidos", "Apellidos").required().searchable().max_len(100))
        .field(FieldDef::upper("numeroDocumento", "N° documento").required().searchable().max_len(20))
        .field(FieldDef::foreign_key("cargoId", "Cargo", "cargos"))
        .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
        .field(FieldDef::date("fechaIngreso", "Fecha de ingreso").default_now())
        .field(FieldDef::enumeration("tipoPersonal", "Tipo", &["MAR", "TIERRA"]).required())
        .field(FieldDef::text("telefono", "Teléfono").max_len(30))
        .field(FieldDef::boolean("activo", "Activo").default_value(json!(true)))
        .audited()
        .reference(Reference::new("cargos", "cargos", "nombre"))
        .reference(Reference::new("empresas", "empresas", "razonSocial"))
        .category("tipoPersonal", "MAR", "TIERRA")
        .display_field("apellidos")
}
