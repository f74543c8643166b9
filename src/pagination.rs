//! Paging and sorting for list endpoints.
//!
//! Query strings look like `?page=0&size=10&sort=dataInscricao,asc`.
//! Sortable properties form a closed set so column names never come from
//! user input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("unknown sort property '{0}'")]
    UnknownProperty(String),
    #[error("unknown sort direction '{0}', expected 'asc' or 'desc'")]
    UnknownDirection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Nome,
    NumeroMatricula,
    NumeroCurso,
    #[default]
    DataInscricao,
}

impl SortField {
    fn parse(property: &str) -> Result<Self, PaginationError> {
        match property {
            "id" => Ok(Self::Id),
            "nome" => Ok(Self::Nome),
            "numeroMatricula" => Ok(Self::NumeroMatricula),
            "numeroCurso" => Ok(Self::NumeroCurso),
            "dataInscricao" => Ok(Self::DataInscricao),
            other => Err(PaginationError::UnknownProperty(other.to_string())),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Nome => "nome",
            Self::NumeroMatricula => "numero_matricula",
            Self::NumeroCurso => "numero_curso",
            Self::DataInscricao => "data_inscricao",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn parse(direction: &str) -> Result<Self, PaginationError> {
        match direction.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(PaginationError::UnknownDirection(direction.to_string())),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    /// Parses `property` or `property,direction`.
    pub fn parse(raw: &str) -> Result<Self, PaginationError> {
        let mut parts = raw.splitn(2, ',');
        let field = SortField::parse(parts.next().unwrap_or_default().trim())?;
        let direction = match parts.next().map(str::trim) {
            Some(d) if !d.is_empty() => Direction::parse(d)?,
            _ => Direction::Asc,
        };
        Ok(Self { field, direction })
    }
}

/// Raw list query parameters. `sort` may repeat; earlier keys take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort: Vec<String>,
}

/// Normalized paging request. `page` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<Sort>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: vec![Sort::default()],
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl TryFrom<PageParams> for PageRequest {
    type Error = PaginationError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        let mut sort = params
            .sort
            .iter()
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(Sort::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if sort.is_empty() {
            sort.push(Sort::default());
        }

        let page = params.page.unwrap_or(0).clamp(0, i64::from(u32::MAX));
        let size = params
            .size
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE));

        Ok(Self {
            page: u32::try_from(page).unwrap_or(0),
            size: u32::try_from(size).unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        })
    }
}

/// A slice of results plus paging metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        let total_pages = total_elements.div_ceil(size);
        let number_of_elements = content.len();
        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
            number_of_elements,
            first: request.page == 0,
            last: u64::from(request.page) + 1 >= total_pages,
        }
    }
}
