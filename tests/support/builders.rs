use brecha::clock::FixedClock;
use brecha::config::Config;
use brecha::engine::Engine;
use brecha::operations::{ItemPatch, NewItem, NewProject};
use brecha::project::{BudgetMode, ItemState, Priority};
use brecha::repository::InMemoryProjectRepository;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine over an in-memory repository with the clock pinned to 2026-02-01.
pub fn memory_engine(config: Config) -> Engine<InMemoryProjectRepository> {
    Engine::with_clock(
        InMemoryProjectRepository::new(),
        config,
        FixedClock::on(date(2026, 2, 1)),
    )
}

pub struct ProjectBuilder {
    codigo: String,
    modo: BudgetMode,
    asignado: Decimal,
    inicio: NaiveDate,
    fin: NaiveDate,
}

impl ProjectBuilder {
    pub fn new(codigo: &str) -> Self {
        Self {
            codigo: codigo.to_string(),
            modo: BudgetMode::PorItems,
            asignado: Decimal::ZERO,
            inicio: date(2026, 1, 1),
            fin: date(2026, 6, 30),
        }
    }

    pub fn global(mut self, asignado: i64) -> Self {
        self.modo = BudgetMode::Global;
        self.asignado = Decimal::from(asignado);
        self
    }

    pub fn schedule(mut self, inicio: NaiveDate, fin: NaiveDate) -> Self {
        self.inicio = inicio;
        self.fin = fin;
        self
    }

    pub fn build(self) -> NewProject {
        NewProject {
            nombre: format!("Remediacion {}", self.codigo),
            codigo: self.codigo,
            descripcion: String::new(),
            prioridad: Priority::Alta,
            categoria: Some("seguridad".to_string()),
            fecha_inicio: self.inicio,
            fecha_fin_estimada: self.fin,
            modo_presupuesto: self.modo,
            presupuesto_asignado: self.asignado,
        }
    }
}

pub struct ItemBuilder {
    item: NewItem,
}

impl ItemBuilder {
    pub fn new(nombre: &str) -> Self {
        Self {
            item: NewItem {
                nombre_item: nombre.to_string(),
                descripcion: None,
                requiere_proveedor: false,
                proveedor: None,
                responsable: "ana".to_string(),
                presupuesto_planificado: Decimal::from(100),
                presupuesto_ejecutado: Decimal::ZERO,
                fecha_inicio: date(2026, 1, 10),
                duracion_dias: 10,
                item_dependencia: None,
            },
        }
    }

    pub fn planned(mut self, amount: i64) -> Self {
        self.item.presupuesto_planificado = Decimal::from(amount);
        self
    }

    pub fn executed(mut self, amount: i64) -> Self {
        self.item.presupuesto_ejecutado = Decimal::from(amount);
        self
    }

    pub fn depends_on(mut self, numero: u32) -> Self {
        self.item.item_dependencia = Some(numero);
        self
    }

    pub fn build(self) -> NewItem {
        self.item
    }
}

pub fn set_state(estado: ItemState) -> ItemPatch {
    ItemPatch {
        estado: Some(estado),
        ..Default::default()
    }
}
