use megui_schema::{DerivedDef, EntitySchema, FieldDef, Reference};

/// Days before expiry at which a document is flagged.
pub const DOCUMENTO_AVISO_DIAS: i64 = 30;

/// Staff documents (licenses, medical certificates) with an expiry flag.
pub fn documentos_personal() -> EntitySchema {
    EntitySchema::new("documento-personal", "Documentos del personal", "documentos-personal")
        .alias("documentos")
        .field(FieldDef::foreign_key("personalId", "Personal", "personal").required().searchable())
        .field(
            FieldDef::enumeration(
                "tipoDocumento",
                "Tipo",
                &["LIBRETA_EMBARQUE", "CERTIFICADO_MEDICO", "LICENCIA", "OTRO"],
            )
            .required()
            .searchable(),
        )
        .field(FieldDef::upper("numero", "Número").required().searchable().max_len(30))
        .field(FieldDef::date("fechaEmision", "Emisión").default_now())
        .field(FieldDef::date("fechaVencimiento", "Vencimiento").required())
        .field(FieldDef::text("observaciones", "Observaciones").max_len(500))
        .derived(DerivedDef::expiry("estadoVigencia", "Vigencia", "fechaVencimiento", DOCUMENTO_AVISO_DIAS))
        .audited()
        .reference(Reference::new("personal", "personal", "apellidos"))
        .display_field("numero")
}
