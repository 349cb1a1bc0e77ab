use megui_schema::{EntitySchema, FieldDef, Reference};

/// Access log line: who entered which facility, and when.
///
/// Entries are read-only history once saved, so rows do not open the
/// edit form.
pub fn acceso_instalacion_detalle() -> EntitySchema {
    EntitySchema::new("acceso-instalacion-detalle", "Accesos a instalación", "acceso-instalacion-detalle")
        .alias("accesos")
        .field(FieldDef::foreign_key("instalacionId", "Instalación", "instalaciones").required().searchable())
        .field(FieldDef::foreign_key("personalId", "Personal", "personal").required().searchable())
        .field(FieldDef::datetime("fechaHoraIngreso", "Ingreso").required().default_now())
        .field(FieldDef::datetime("fechaHoraSalida", "Salida"))
        .field(FieldDef::enumeration("motivo", "Motivo", &["TRABAJO", "VISITA", "ENTREGA"]).required())
        .field(FieldDef::upper("placaVehiculo", "Placa").max_len(10).searchable())
        .field(FieldDef::text("observaciones", "Observaciones").max_len(500))
        .audited()
        .reference(Reference::new("instalaciones", "instalaciones", "nombre"))
        .reference(Reference::new("personal", "personal", "apellidos"))
        .no_row_edit()
        .display_field("placaVehiculo")
}
