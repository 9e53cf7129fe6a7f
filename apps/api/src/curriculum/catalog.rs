//! Curriculum Catalog: the static registry of known course curricula.
//!
//! Built once at startup and shared read-only through `AppState`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identity of a built-in curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurriculumId {
    Cpp,
    CSharp,
    C,
    SpringBoot,
    ReactAdvanced,
    NodeExpress,
    JavaScript,
    Python,
    HtmlCss,
}

impl CurriculumId {
    pub const ALL: [CurriculumId; 9] = [
        CurriculumId::Cpp,
        CurriculumId::CSharp,
        CurriculumId::C,
        CurriculumId::SpringBoot,
        CurriculumId::ReactAdvanced,
        CurriculumId::NodeExpress,
        CurriculumId::JavaScript,
        CurriculumId::Python,
        CurriculumId::HtmlCss,
    ];
}

/// Leaf unit of completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Lesson {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: None,
        }
    }
}

/// Ordered unit within a curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

impl Module {
    pub fn new(id: impl Into<String>, title: impl Into<String>, lessons: Vec<Lesson>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            lessons,
        }
    }
}

/// Explicit map from curriculum identity to its module list.
#[derive(Debug, Clone, Default)]
pub struct CurriculumCatalog {
    curricula: HashMap<CurriculumId, Vec<Module>>,
}

impl CurriculumCatalog {
    /// Catalog with every built-in curriculum.
    pub fn builtin() -> Self {
        let curricula = CurriculumId::ALL
            .iter()
            .map(|id| (*id, seed_modules(seeds_for(*id))))
            .collect();
        Self { curricula }
    }

    pub fn from_modules(entries: impl IntoIterator<Item = (CurriculumId, Vec<Module>)>) -> Self {
        Self {
            curricula: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, id: CurriculumId) -> Option<&[Module]> {
        self.curricula.get(&id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.curricula.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curricula.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in curriculum data
// ────────────────────────────────────────────────────────────────────────────

struct ModuleSeed {
    id: &'static str,
    title: &'static str,
    lessons: &'static [(&'static str, &'static str)],
}

fn seed_modules(seeds: &[ModuleSeed]) -> Vec<Module> {
    seeds
        .iter()
        .map(|seed| {
            Module::new(
                seed.id,
                seed.title,
                seed.lessons
                    .iter()
                    .map(|(id, title)| Lesson::new(*id, *title))
                    .collect(),
            )
        })
        .collect()
}

fn seeds_for(id: CurriculumId) -> &'static [ModuleSeed] {
    match id {
        CurriculumId::Cpp => CPP,
        CurriculumId::CSharp => CSHARP,
        CurriculumId::C => C_LANG,
        CurriculumId::SpringBoot => SPRING_BOOT,
        CurriculumId::ReactAdvanced => REACT_ADVANCED,
        CurriculumId::NodeExpress => NODE_EXPRESS,
        CurriculumId::JavaScript => JAVASCRIPT,
        CurriculumId::Python => PYTHON,
        CurriculumId::HtmlCss => HTML_CSS,
    }
}

const CPP: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Fundamentos de C++",
        lessons: &[
            ("cpp-m1-l1", "Instalación del compilador y primer programa"),
            ("cpp-m1-l2", "Variables, tipos y operadores"),
            ("cpp-m1-l3", "Entrada y salida con iostream"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Control de flujo y funciones",
        lessons: &[
            ("cpp-m2-l1", "Condicionales y switch"),
            ("cpp-m2-l2", "Bucles for, while y do-while"),
            ("cpp-m2-l3", "Funciones, sobrecarga y referencias"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Memoria y punteros",
        lessons: &[
            ("cpp-m3-l1", "Punteros y aritmética de punteros"),
            ("cpp-m3-l2", "Memoria dinámica con new y delete"),
            ("cpp-m3-l3", "Punteros inteligentes"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "Programación orientada a objetos",
        lessons: &[
            ("cpp-m4-l1", "Clases, constructores y destructores"),
            ("cpp-m4-l2", "Herencia y polimorfismo"),
            ("cpp-m4-l3", "Plantillas y la STL"),
        ],
    },
];

const CSHARP: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Introducción a C# y .NET",
        lessons: &[
            ("cs-m1-l1", "El ecosistema .NET"),
            ("cs-m1-l2", "Tipos de valor y de referencia"),
            ("cs-m1-l3", "Control de flujo"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Orientación a objetos en C#",
        lessons: &[
            ("cs-m2-l1", "Clases, propiedades y métodos"),
            ("cs-m2-l2", "Interfaces y herencia"),
            ("cs-m2-l3", "Genéricos"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Colecciones y LINQ",
        lessons: &[
            ("cs-m3-l1", "List, Dictionary y HashSet"),
            ("cs-m3-l2", "Consultas LINQ"),
            ("cs-m3-l3", "Expresiones lambda y delegados"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "Programación asíncrona",
        lessons: &[
            ("cs-m4-l1", "Tareas y async/await"),
            ("cs-m4-l2", "Manejo de excepciones"),
            ("cs-m4-l3", "Proyecto final de consola"),
        ],
    },
];

const C_LANG: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Primeros pasos en C",
        lessons: &[
            ("c-m1-l1", "Compilar con gcc"),
            ("c-m1-l2", "Tipos de datos y printf"),
            ("c-m1-l3", "Operadores y expresiones"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Estructuras de control",
        lessons: &[
            ("c-m2-l1", "if, else y switch"),
            ("c-m2-l2", "Bucles"),
            ("c-m2-l3", "Funciones y ámbito"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Arreglos, cadenas y punteros",
        lessons: &[
            ("c-m3-l1", "Arreglos unidimensionales y matrices"),
            ("c-m3-l2", "Cadenas de caracteres"),
            ("c-m3-l3", "Punteros y malloc"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "Estructuras y archivos",
        lessons: &[
            ("c-m4-l1", "struct y typedef"),
            ("c-m4-l2", "Lectura y escritura de archivos"),
            ("c-m4-l3", "Proyecto: agenda en consola"),
        ],
    },
];

const SPRING_BOOT: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Arranque de un proyecto Spring Boot",
        lessons: &[
            ("sb-m1-l1", "Spring Initializr y estructura del proyecto"),
            ("sb-m1-l2", "Inyección de dependencias"),
            ("sb-m1-l3", "Configuración con application.yml"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "APIs REST",
        lessons: &[
            ("sb-m2-l1", "Controladores y rutas"),
            ("sb-m2-l2", "Validación de peticiones"),
            ("sb-m2-l3", "Manejo global de errores"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Persistencia con Spring Data JPA",
        lessons: &[
            ("sb-m3-l1", "Entidades y repositorios"),
            ("sb-m3-l2", "Relaciones entre entidades"),
            ("sb-m3-l3", "Migraciones con Flyway"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "Seguridad y despliegue",
        lessons: &[
            ("sb-m4-l1", "Spring Security y JWT"),
            ("sb-m4-l2", "Pruebas con JUnit y MockMvc"),
            ("sb-m4-l3", "Empaquetado y despliegue"),
        ],
    },
];

const REACT_ADVANCED: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Hooks avanzados",
        lessons: &[
            ("ra-m1-l1", "useReducer y estado complejo"),
            ("ra-m1-l2", "useMemo y useCallback"),
            ("ra-m1-l3", "Hooks personalizados"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Gestión de estado global",
        lessons: &[
            ("ra-m2-l1", "Context API a fondo"),
            ("ra-m2-l2", "Redux Toolkit"),
            ("ra-m2-l3", "Sincronización con el servidor"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Rendimiento",
        lessons: &[
            ("ra-m3-l1", "Perfilado de renders"),
            ("ra-m3-l2", "Carga diferida y Suspense"),
            ("ra-m3-l3", "Listas virtualizadas"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "Arquitectura y pruebas",
        lessons: &[
            ("ra-m4-l1", "Patrones de composición"),
            ("ra-m4-l2", "Pruebas con Testing Library"),
            ("ra-m4-l3", "Proyecto final"),
        ],
    },
];

const NODE_EXPRESS: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Node.js esencial",
        lessons: &[
            ("ne-m1-l1", "El bucle de eventos"),
            ("ne-m1-l2", "Módulos y npm"),
            ("ne-m1-l3", "Sistema de archivos y streams"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Servidores con Express",
        lessons: &[
            ("ne-m2-l1", "Rutas y middleware"),
            ("ne-m2-l2", "Validación y manejo de errores"),
            ("ne-m2-l3", "Autenticación con JWT"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Bases de datos",
        lessons: &[
            ("ne-m3-l1", "MongoDB con Mongoose"),
            ("ne-m3-l2", "SQL con un ORM"),
            ("ne-m3-l3", "Despliegue de la API"),
        ],
    },
];

const JAVASCRIPT: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Sintaxis básica",
        lessons: &[
            ("js-m1-l1", "Variables con let y const"),
            ("js-m1-l2", "Tipos y coerción"),
            ("js-m1-l3", "Operadores y condicionales"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Funciones y objetos",
        lessons: &[
            ("js-m2-l1", "Funciones flecha y closures"),
            ("js-m2-l2", "Objetos y prototipos"),
            ("js-m2-l3", "Clases"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Arreglos",
        lessons: &[
            ("js-m3-l1", "map, filter y reduce"),
            ("js-m3-l2", "Desestructuración y spread"),
            ("js-m3-l3", "Iteradores"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "El navegador",
        lessons: &[
            ("js-m4-l1", "Manipulación del DOM"),
            ("js-m4-l2", "Eventos"),
            ("js-m4-l3", "Almacenamiento local"),
        ],
    },
    ModuleSeed {
        id: "modulo-5",
        title: "Asincronía",
        lessons: &[
            ("js-m5-l1", "Promesas"),
            ("js-m5-l2", "async/await"),
            ("js-m5-l3", "Consumo de APIs con fetch"),
        ],
    },
];

const PYTHON: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "Introducción a Python",
        lessons: &[
            ("py-m1-l1", "Instalación y el intérprete"),
            ("py-m1-l2", "Variables y tipos"),
            ("py-m1-l3", "Cadenas y formato"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Estructuras de datos",
        lessons: &[
            ("py-m2-l1", "Listas y tuplas"),
            ("py-m2-l2", "Diccionarios y conjuntos"),
            ("py-m2-l3", "Comprensiones"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Funciones y módulos",
        lessons: &[
            ("py-m3-l1", "Definición de funciones"),
            ("py-m3-l2", "Módulos y paquetes"),
            ("py-m3-l3", "Entornos virtuales"),
        ],
    },
    ModuleSeed {
        id: "modulo-4",
        title: "Programación orientada a objetos",
        lessons: &[
            ("py-m4-l1", "Clases y objetos"),
            ("py-m4-l2", "Herencia"),
            ("py-m4-l3", "Métodos especiales"),
        ],
    },
    ModuleSeed {
        id: "modulo-5",
        title: "Archivos y excepciones",
        lessons: &[
            ("py-m5-l1", "Lectura y escritura de archivos"),
            ("py-m5-l2", "Manejo de excepciones"),
            ("py-m5-l3", "Proyecto final"),
        ],
    },
];

const HTML_CSS: &[ModuleSeed] = &[
    ModuleSeed {
        id: "modulo-1",
        title: "HTML semántico",
        lessons: &[
            ("hc-m1-l1", "Estructura de un documento"),
            ("hc-m1-l2", "Etiquetas semánticas"),
            ("hc-m1-l3", "Formularios"),
        ],
    },
    ModuleSeed {
        id: "modulo-2",
        title: "Fundamentos de CSS",
        lessons: &[
            ("hc-m2-l1", "Selectores y especificidad"),
            ("hc-m2-l2", "Modelo de caja"),
            ("hc-m2-l3", "Tipografía y color"),
        ],
    },
    ModuleSeed {
        id: "modulo-3",
        title: "Maquetación",
        lessons: &[
            ("hc-m3-l1", "Flexbox"),
            ("hc-m3-l2", "CSS Grid"),
            ("hc-m3-l3", "Diseño responsivo"),
        ],
    },
];
