use crate::domain::model::{Allotment, Course, Teacher, TeacherDetails};
use crate::utils::error::Result;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
}

pub trait Tabular {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl Tabular for Teacher {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Email", "Department"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone(), self.department.clone()]
    }
}

impl Tabular for Course {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Course Name", "Course Code", "Hours"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.code.clone(),
            self.hours.to_string(),
        ]
    }
}

impl Tabular for Allotment {
    fn headers() -> Vec<&'static str> {
        vec!["Teacher", "Email", "Courses", "Total Hours"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.teacher_name.clone(),
            self.teacher_email.clone(),
            self.courses.len().to_string(),
            self.total_hours().to_string(),
        ]
    }
}

pub fn render<'a, T, I, W>(out: &mut W, rows: I, format: OutputFormat) -> Result<()>
where
    T: Tabular + 'a,
    I: IntoIterator<Item = &'a T>,
    W: Write,
{
    let rows: Vec<Vec<String>> = rows.into_iter().map(Tabular::row).collect();
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(T::headers())?;
            for row in &rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(out, &T::headers(), &rows)?,
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ")
    )?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

/// 「Showing 1 of 3 courses」
pub fn summary_line(shown: usize, total: usize, noun: &str) -> String {
    format!("Showing {} of {} {}", shown, total, noun)
}

/// 展開後的分配明細：每位教師一段，列出課程
pub fn render_allotment_details<'a, W: Write>(
    out: &mut W,
    allotments: impl IntoIterator<Item = &'a Allotment>,
) -> Result<()> {
    for allotment in allotments {
        writeln!(
            out,
            "{} <{}>  {} course(s), {} hrs",
            allotment.teacher_name,
            allotment.teacher_email,
            allotment.courses.len(),
            allotment.total_hours()
        )?;
        if allotment.courses.is_empty() {
            writeln!(out, "    (no courses)")?;
        }
        for course in &allotment.courses {
            writeln!(out, "    {} ({}) - {} hrs", course.name, course.code, course.hours)?;
        }
    }
    Ok(())
}

pub fn render_teacher_details<W: Write>(out: &mut W, details: &TeacherDetails) -> Result<()> {
    writeln!(out, "Teacher Name: {}", details.teacher.name)?;
    writeln!(out, "Email: {}", details.teacher.email)?;
    writeln!(out, "Assigned Courses:")?;
    for course in &details.courses {
        writeln!(out, "    {} ({}) - {} hrs", course.name, course.code, course.hours)?;
    }
    writeln!(out, "Total: {} hrs", details.total_hours())?;
    Ok(())
}
