// Dimension registry - Static catalog of groupable dimensions
use crate::domain::dimension::{DimensionDefinition, Granularity};
use std::sync::{Arc, OnceLock};

/// Field every built-in temporal dimension and date range reads
pub const DEFAULT_DATE_FIELD: &str = "date";

#[derive(Debug, Clone)]
pub struct DimensionRegistry {
    dimensions: Vec<DimensionDefinition>,
}

impl DimensionRegistry {
    pub fn from_definitions(definitions: Vec<DimensionDefinition>) -> Self {
        let mut dimensions: Vec<DimensionDefinition> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if dimensions.iter().any(|d| d.id == definition.id) {
                tracing::warn!("Ignoring duplicate dimension definition {}", definition.id);
                continue;
            }
            dimensions.push(definition);
        }
        Self { dimensions }
    }

    pub fn builtin() -> Arc<DimensionRegistry> {
        static BUILTIN: OnceLock<Arc<DimensionRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Arc::new(DimensionRegistry::from_definitions(builtin_dimensions())))
            .clone()
    }

    pub fn all(&self) -> &[DimensionDefinition] {
        &self.dimensions
    }

    pub fn get(&self, id: &str) -> Option<&DimensionDefinition> {
        self.dimensions.iter().find(|d| d.id == id)
    }
}

fn builtin_dimensions() -> Vec<DimensionDefinition> {
    vec![
        DimensionDefinition::temporal("por_hora", "Por hora", DEFAULT_DATE_FIELD, Granularity::Hour),
        DimensionDefinition::temporal("por_dia", "Por dia", DEFAULT_DATE_FIELD, Granularity::Day),
        DimensionDefinition::temporal("por_semana", "Por semana", DEFAULT_DATE_FIELD, Granularity::Week),
        DimensionDefinition::temporal("por_mes", "Por mês", DEFAULT_DATE_FIELD, Granularity::Month),
        DimensionDefinition::temporal("por_trimestre", "Por trimestre", DEFAULT_DATE_FIELD, Granularity::Quarter),
        DimensionDefinition::temporal("por_ano", "Por ano", DEFAULT_DATE_FIELD, Granularity::Year),
        DimensionDefinition::categorical(
            "categoria",
            "Categoria",
            "category",
            &["condominio", "manutencao", "reserva", "multa", "consulta"],
        ),
        DimensionDefinition::categorical("status", "Status", "status", &["pago", "pendente", "atrasado", "cancelado"]),
        DimensionDefinition::categorical("unidade", "Unidade", "unit", &[]),
        DimensionDefinition::categorical("responsavel", "Responsável", "owner", &[]),
        DimensionDefinition::numeric("faixa_valor", "Faixa de valor", "amount", 500.0),
    ]
}
