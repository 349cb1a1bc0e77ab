use megui_schema::{EntitySchema, FieldDef, Reference};
use serde_json::json;

pub fn lista_precios() -> EntitySchema {
    EntitySchema::new("lista-precios", "Listas de precios", "lista-precios")
        .alias("precios")
        .field(FieldDef::text("nombre", "Nombre").required().searchable().max_len(100))
        .field(FieldDef::text("descripcion", "Descripción").max_len(250))
        .field(FieldDef::foreign_key("monedaId", "Moneda", "monedas").required())
        .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
        .field(FieldDef::date("vigenciaDesde", "Vigente desde").required().default_now())
        .field(FieldDef::date("vigenciaHasta", "Vigente hasta"))
        .field(FieldDef::boolean("esDefault", "Por defecto").default_value(json!(false)))
        .field(FieldDef::boolean("activo", "Activo").default_value(json!(true)))
        .audited()
        .reference(Reference::new("monedas", "monedas", "codigo"))
        .reference(Reference::new("empresas", "empresas", "razonSocial"))
        .category("esDefault", "true", "false")
}

/// Freight rate between two ports.
pub fn tarifas_ruta() -> EntitySchema {
    EntitySchema::new("tarifa-ruta", "Tarifas por ruta", "tarifas-ruta")
        .alias("tarifas")
        .field(FieldDef::foreign_key("puertoOrigenId", "Origen", "puertos").required().searchable())
        .field(FieldDef::foreign_key("puertoDestinoId", "Destino", "puertos").required().searchable())
        .field(FieldDef::foreign_key("monedaId", "Moneda", "monedas").required())
        .field(FieldDef::money("tarifa", "Tarifa").required())
        .field(FieldDef::decimal("distanciaMillas", "Distancia (mn)", 1).range(0.0, f64::MAX))
        .field(FieldDef::integer("diasTransito", "Días de tránsito").range(0.0, 365.0))
        .field(FieldDef::boolean("activo", "Activo").default_value(json!(true)))
        .audited()
        .reference(Reference::new("puertos", "puertos", "nombre"))
        .reference(Reference::new("monedas", "monedas", "codigo"))
        .display_field("tarifa")
}
