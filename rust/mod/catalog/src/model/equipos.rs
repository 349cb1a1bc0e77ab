use megui_schema::{EntitySchema, FieldDef, Reference};

/// Equipment. The number is unique per equipment type; the backend
/// answers `GET equipos/validar-numero?numeroEquipo=..&tipoEquipoId=..`.
pub fn equipos() -> EntitySchema {
    EntitySchema::new("equipo", "Equipos", "equipos")
        .field(FieldDef::upper("numeroEquipo", "Número").required().searchable().max_len(20))
        .field(FieldDef::foreign_key("tipoEquipoId", "Tipo de equipo", "tipos-equipo").required().searchable())
        .field(FieldDef::text("descripcion", "Descripción").searchable().max_len(150))
        .field(FieldDef::text("marca", "Marca").searchable().max_len(60))
        .field(FieldDef::text("modelo", "Modelo").max_len(60))
        .field(FieldDef::enumeration("propiedad", "Propiedad", &["PROPIO", "ARRENDADO"]).required())
        .field(FieldDef::date("fechaAdquisicion", "Fecha de adquisición").default_now())
        .field(FieldDef::money("costo", "Costo"))
        .field(FieldDef::foreign_key("empresaId", "Empresa", "empresas").required())
        .audited()
        .unique(
            "numeroEquipo",
            &["tipoEquipoId"],
            "validar-numero",
            "Ya existe un equipo con ese número para el tipo seleccionado",
        )
        .reference(Reference::new("tipos-equipo", "tipos-equipo", "nombre"))
        .reference(Reference::new("empresas", "empresas", "razonSocial"))
        .category("propiedad", "PROPIO", "ARRENDADO")
        .display_field("numeroEquipo")
}
