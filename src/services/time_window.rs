// src/services/time_window.rs
//
// Normalização de horários: offset fixo da igreja + horário informado pelo
// cliente => instante absoluto em UTC, e janelas de "dia local".

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use serde::Deserialize;

use crate::common::error::AppError;

/// Faixa aceita para o offset de uma igreja (UTC-12:00 até UTC+14:00).
pub const MIN_OFFSET_MINUTES: i32 = -12 * 60;
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

// Formatos aceitos para horários sem offset (hora local da igreja).
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

// ---
// 1. Offset fixo da igreja
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOffset {
    minutes: i32,
    fixed: FixedOffset,
}

impl TimeOffset {
    /// `0` é um offset válido (igreja em UTC), não "sem valor".
    pub fn from_minutes(minutes: i32) -> Result<Self, AppError> {
        if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(AppError::Validation(format!(
                "Offset de fuso fora da faixa: {minutes} minutos"
            )));
        }
        let fixed = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            AppError::Validation(format!("Offset de fuso inválido: {minutes} minutos"))
        })?;
        Ok(Self { minutes, fixed })
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    /// Hora de parede local -> instante UTC (utc = local - offset).
    pub fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        Utc.from_utc_datetime(&(local - TimeDelta::minutes(i64::from(self.minutes))))
    }

    /// `[meia-noite local, próxima meia-noite local)` do dia em que `now` cai,
    /// no offset da igreja (nunca no do servidor).
    pub fn day_window(&self, now: DateTime<Utc>) -> TimeWindow {
        let local_day = now.with_timezone(&self.fixed).date_naive();
        let start = self.local_to_utc(local_day.and_time(NaiveTime::MIN));
        TimeWindow {
            start,
            end: start + TimeDelta::days(1),
        }
    }
}

// ---
// 2. Intervalo semiaberto [start, end)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::Validation(
                "A data de início deve ser anterior à data de término".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    // Para dados vindos do banco, onde a constraint CHECK já garante start < end.
    pub(crate) fn from_stored(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Sobreposição semiaberta: encostar (fim == início) não conflita.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

// ---
// 3. Horário enviado pelo cliente
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ClientTimestamp {
    /// Trazia `Z` ou offset explícito.
    Absolute(DateTime<Utc>),
    /// Hora de parede, sem offset.
    Local(NaiveDateTime),
}

impl ClientTimestamp {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();

        if let Ok(absolute) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ClientTimestamp::Absolute(absolute.with_timezone(&Utc)));
        }

        for format in LOCAL_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(ClientTimestamp::Local(local));
            }
        }

        // Só a data: meia-noite local
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| ClientTimestamp::Local(date.and_time(NaiveTime::MIN)))
            .map_err(|_| AppError::Validation(format!("Data/hora inválida: '{raw}'")))
    }

    pub fn resolve(&self, offset: TimeOffset) -> DateTime<Utc> {
        match self {
            ClientTimestamp::Absolute(instant) => *instant,
            ClientTimestamp::Local(local) => offset.local_to_utc(*local),
        }
    }
}

impl TryFrom<String> for ClientTimestamp {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClientTimestamp::parse(&value)
    }
}

/// Mesma regra na criação e na atualização: tudo passa pelo offset da igreja.
pub fn normalize_interval(
    start: &ClientTimestamp,
    end: &ClientTimestamp,
    offset: TimeOffset,
) -> Result<TimeWindow, AppError> {
    TimeWindow::new(start.resolve(offset), end.resolve(offset))
}
