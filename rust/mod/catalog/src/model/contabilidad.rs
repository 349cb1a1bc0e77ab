use megui_schema::{EntitySchema, FieldDef, Reference};

/// Debit/credit account pair used when posting operations of a company.
pub fn configuracion_cuenta_contable() -> EntitySchema {
    EntitySchema::new(
        "configuracion-cuenta-contable",
        "Configuración de cuentas contables",
        "configuracion-cuenta-contable",
    )
    .alias("cuenta-contable")
    .alias("cuentas")
    .field(FieldDef::text("descripcion", "Descripción").required().searchable().max_len(150))
    .field(FieldDef::upper("cuentaContableDebe", "Cuenta debe").required().searchable().max_len(20))
    .field(FieldDef::upper("cuentaContableHaber", "Cuenta haber").required().searchable().max_len(20))
    .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
    .field(FieldDef::foreign_key("monedaId", "Moneda", "monedas"))
    .field(FieldDef::enumeration("tipoOperacion", "Tipo de operación", &["COMPRA", "VENTA"]).required())
    .audited()
    .reference(Reference::new("empresas", "empresas", "razonSocial"))
    .reference(Reference::new("monedas", "monedas", "codigo"))
    .category("tipoOperacion", "COMPRA", "VENTA")
    .display_field("descripcion")
}
