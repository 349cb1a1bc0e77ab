use megui_schema::{DerivedDef, EntitySchema, FieldDef, Reference};

/// Fishing-trip settlement. Yield is catch over hold capacity; the crew
/// share is the crew amount over the gross amount. The share may be
/// typed over by the user, in which case it is persisted.
pub fn liquidaciones_faena() -> EntitySchema {
    EntitySchema::new("liquidacion-faena", "Liquidaciones de faena", "liquidaciones-faena")
        .alias("liquidaciones")
        .alias("faenas")
        .field(FieldDef::upper("numeroLiquidacion", "N° liquidación").required().searchable().max_len(20))
        .field(FieldDef::foreign_key("embarcacionId", "Embarcación", "embarcaciones").required().searchable())
        .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
        .field(FieldDef::date("fechaZarpe", "Zarpe").required().default_now())
        .field(FieldDef::date("fechaArribo", "Arribo"))
        .field(FieldDef::decimal("capacidadBodegaTm", "Capacidad bodega (t)", 3).range(0.0, f64::MAX))
        .field(FieldDef::decimal("capturaTm", "Captura (t)", 3).range(0.0, f64::MAX))
        .field(FieldDef::money("montoBruto", "Monto bruto"))
        .field(FieldDef::money("montoTripulacion", "Monto tripulación"))
        .field(FieldDef::enumeration("estado", "Estado", &["BORRADOR", "CERRADA"]).required())
        .derived(DerivedDef::ratio("rendimiento", "Rendimiento %", "capturaTm", "capacidadBodegaTm"))
        .derived(
            DerivedDef::ratio("porcentajeTripulacion", "% tripulación", "montoTripulacion", "montoBruto")
                .overridable(),
        )
        .audited()
        .unique("numeroLiquidacion", &["empresaId"], "validar-numero", "El número de liquidación ya existe")
        .reference(Reference::new("embarcaciones", "embarcaciones", "nombre"))
        .reference(Reference::new("empresas", "empresas", "razonSocial"))
        .category("estado", "BORRADOR", "CERRADA")
        .display_field("numeroLiquidacion")
}

/// Crew manifest line: one person on one settlement.
pub fn tripulantes() -> EntitySchema {
    EntitySchema::new("tripulante", "Tripulantes", "tripulantes")
        .alias("tripulacion")
        .field(FieldDef::foreign_key("liquidacionFaenaId", "Liquidación", "liquidaciones-faena").required().searchable())
        .field(FieldDef::foreign_key("personalId", "Personal", "personal").required().searchable())
        .field(FieldDef::foreign_key("cargoId", "Cargo", "cargos").required().searchable())
        .field(FieldDef::decimal("partes", "Partes", 2).range(0.0, 100.0))
        .field(FieldDef::money("anticipo", "Anticipo"))
        .audited()
        .reference(Reference::new("liquidaciones-faena", "liquidaciones-faena", "numeroLiquidacion"))
        .reference(Reference::new("personal", "personal", "apellidos"))
        .reference(Reference::new("cargos", "cargos", "nombre"))
        .display_field("personalId")
}
