//! Server-rendered HTML of the dashboard page.

use compute::{Horizon, RenderOutput};

pub const PAGE_TITLE: &str = "Tech Challenge Fase 4 - Pós-Tech FIAP";
pub const MEMBERS_HEADING: &str = "Pós Tech - 4DTAT (G38):";
pub const DOWNLOAD_LABEL: &str = "Baixar tabela como .csv";
pub const PREDICT_LABEL: &str = "Prever";

const MEMBERS: [&str; 5] = [
    "Pedro Henrique Webster Carneiro",
    "Renata Oliveira de Jesus",
    "Alessandra Renata Brunelli",
    "Guilherme Rodrigues Deizeppe",
    "Flavia Vieira da Silva",
];

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const DASHBOARD_WIDTH: u32 = 1000;
const DASHBOARD_HEIGHT: u32 = 1280;

/// Page tabs, selected with `?aba=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Introducao,
    Dashboard,
    Modelo,
    Codigo,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Introducao, Tab::Dashboard, Tab::Modelo, Tab::Codigo];

    /// Unknown values fall back to the introduction.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("dashboard") => Tab::Dashboard,
            Some("modelo") => Tab::Modelo,
            Some("codigo") => Tab::Codigo,
            _ => Tab::Introducao,
        }
    }

    pub fn param(self) -> &'static str {
        match self {
            Tab::Introducao => "introducao",
            Tab::Dashboard => "dashboard",
            Tab::Modelo => "modelo",
            Tab::Codigo => "codigo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Introducao => "Introdução",
            Tab::Dashboard => "Dashboard & Insights",
            Tab::Modelo => "Modelo Preditivo",
            Tab::Codigo => "Código do Modelo",
        }
    }

    pub fn href(self) -> String {
        format!("/?aba={}", self.param())
    }
}

/// Everything a page render needs.
#[derive(Debug)]
pub struct PageView<'a> {
    pub tab: Tab,
    pub horizon: Horizon,
    pub dashboard_url: &'a str,
    pub forecast: Option<&'a RenderOutput>,
}

pub fn members_sorted() -> Vec<&'static str> {
    let mut members = MEMBERS.to_vec();
    members.sort_unstable();
    members
}

pub fn render_page(view: &PageView<'_>) -> Result<String, serde_json::Error> {
    let body = match view.tab {
        Tab::Introducao => introduction(),
        Tab::Dashboard => dashboard(view.dashboard_url),
        Tab::Modelo => model_tab(view.horizon, view.forecast)?,
        Tab::Codigo => code_tab(),
    };
    Ok(layout(view.tab, &body, view.forecast.is_some()))
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<section class=\"erro\"><h2>Erro</h2><p>{}</p><p><a href=\"{}\">Voltar</a></p></section>",
        escape_html(message),
        Tab::Modelo.href()
    );
    layout(Tab::Modelo, &body, false)
}

fn layout(active: Tab, body: &str, with_chart: bool) -> String {
    let members: String = members_sorted()
        .into_iter()
        .map(|member| format!("<li>{}</li>", escape_html(member)))
        .collect();

    let tabs: String = Tab::ALL
        .iter()
        .map(|&tab| {
            let class = if tab == active { " class=\"ativa\"" } else { "" };
            format!("<a href=\"{}\"{class}>{}</a>", tab.href(), escape_html(tab.label()))
        })
        .collect();

    let plotly = if with_chart {
        format!("<script src=\"{PLOTLY_CDN}\" charset=\"utf-8\"></script>")
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem 2rem; }}
nav.abas a {{ margin-right: 1.5rem; text-decoration: none; color: #31333f; padding-bottom: .4rem; }}
nav.abas a.ativa {{ color: #ff4b4b; border-bottom: 2px solid #ff4b4b; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid #ddd; padding: .3rem .8rem; text-align: right; }}
.tabela {{ max-height: 300px; overflow-y: auto; display: inline-block; }}
pre {{ background: #f0f2f6; padding: 1rem; overflow-x: auto; }}
</style>
{plotly}
</head>
<body>
<h1>{title}</h1>
<p><strong>{heading}</strong></p>
<ul class="membros">{members}</ul>
<nav class="abas">{tabs}</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(PAGE_TITLE),
        heading = escape_html(MEMBERS_HEADING),
    )
}

fn introduction() -> String {
    r#"<h2>Introdução Tech Challenge FIAP - Data Analytics - Fase 4</h2>
<p>Este trabalho tem como objetivo a análise e previsão do preço do petróleo utilizando ferramentas e técnicas de análise de dados e modelagem preditiva. A proposta foi desenvolvida como parte do Tech Challenge FIAP - Data Analytics, Fase 4, e aborda a variação do preço do petróleo Brent ao longo do tempo, fornecendo insights valiosos e projeções futuras.</p>
<p>Para atender a demanda do cliente, criamos uma solução que combina análise visual e previsão de dados. O trabalho foi dividido em três etapas principais:</p>
<ol>
<li><strong>Análise exploratória e visualização dos dados</strong>: Desenvolvemos um dashboard interativo no Looker Studio, que apresenta informações sobre o comportamento histórico dos preços do petróleo. O dashboard inclui métricas estatísticas, gráficos de variação de preços e filtros para análise de dados por diferentes períodos e eventos históricos que impactaram no preço do petróleo.</li>
<li><strong>Modelo preditivo com a biblioteca Prophet</strong>: Utilizamos a biblioteca Prophet para prever os preços futuros do petróleo, baseando-nos em dados históricos. O modelo gerado permite aos usuários inserir um número de dias para prever o preço do petróleo, gerando estimativas com base em dados passados e exibindo gráficos interativos e tabelas com os resultados da previsão.</li>
<li><strong>Código do modelo</strong>: O código em Python que implementa o modelo preditivo com Prophet está disponível, permitindo a reprodução dos resultados e a realização de ajustes personalizados no modelo.</li>
</ol>
<p>A seguir, você encontrará o dashboard com os insights sobre a variação dos preços do petróleo, a previsão do modelo e o código utilizado para a construção do modelo preditivo. Esperamos que esta análise seja útil para compreender melhor as flutuações nos preços do petróleo e suas tendências futuras.</p>"#
        .to_string()
}

fn dashboard(url: &str) -> String {
    format!(
        r#"<h2>Dashboard Looker com Insights Sobre Variação do Preço do Petróleo</h2>
<p>Para atender ao pedido do cliente, optamos por desenvolver o dashboard no Looker Studio, uma ferramenta online que transforma dados em dashboards interativos e personalizáveis.</p>
<p>O primeiro elemento incluído no dashboard foram as métricas estatísticas, que oferecem uma visão geral do comportamento dos preços do petróleo, destacando o preço máximo, mínimo e médio históricos.</p>
<p>Em seguida, adicionamos gráficos sob duas perspectivas:</p>
<ul>
<li>A primeira (ver primeiro gráfico de linhas) mostra um registro diário dos preços do petróleo Brent, permitindo a visualização das variações ao longo do tempo, com dados exclusivamente na granularidade diária.</li>
<li>A segunda (ver segundo gráfico de linhas) também exibe registros diários dos preços do Brent, mas segmenta-os por eventos históricos relevantes, como a pandemia de COVID-19. Neste gráfico, habilitamos a funcionalidade "Detalhar", que possibilita ao usuário explorar dados em diferentes níveis de granularidade ao clicar na seta acima do gráfico.</li>
</ul>
<p>Por fim, adicionamos filtros que permitem aos usuários pesquisar não apenas por períodos específicos, mas também por eventos históricos que impactaram significativamente os preços do petróleo.</p>
<p>Em resumo, nosso objetivo foi desenvolver um dashboard em uma plataforma intuitiva, proporcionando aos clientes uma experiência simples e direta, com opções de filtros úteis e um design visualmente agradável.</p>
<iframe src="{src}" width="{DASHBOARD_WIDTH}" height="{DASHBOARD_HEIGHT}" frameborder="0" style="border:0" allowfullscreen></iframe>"#,
        src = escape_html(url),
    )
}

fn model_tab(horizon: Horizon, forecast: Option<&RenderOutput>) -> Result<String, serde_json::Error> {
    let mut html = format!(
        r#"<h2>Previsão do Preço de Petróleo (US$) Utilizando a Biblioteca Prophet</h2>
<p>Este projeto utiliza a biblioteca Prophet para prever o preço diário em US$ do barril de Petróleo. O modelo criado foi treinado com dados do ano de 2024 (até o dia 9 de Setembro) e possui as seguintes métricas de acurária (MSE: 11.92, RMSE: 3.45 e MAPE: 2.82 %). O usuário pode inserir o número de dias para os quais deseja a previsão, e o modelo gerará um gráfico interativo contendo as estimativas baseadas em dados históricos de preço. Além disso, uma tabela será exibida com os valores estimados para cada dia.</p>
<h3>Insira o número de dias para previsão:</h3>
<form method="post" action="/prever">
<input type="number" name="dias" min="{min}" max="{max}" step="{step}" value="{value}" required>
<button type="submit">{PREDICT_LABEL}</button>
</form>
"#,
        min = Horizon::MIN,
        max = Horizon::MAX,
        step = Horizon::STEP,
        value = horizon.days(),
    );

    if let Some(output) = forecast {
        html.push_str(&forecast_section(output)?);
    }
    Ok(html)
}

fn forecast_section(output: &RenderOutput) -> Result<String, serde_json::Error> {
    // "</" would close the script element early.
    let figure = serde_json::to_string(&output.chart)?.replace("</", "<\\/");

    let rows: String = output
        .table
        .rows
        .iter()
        .map(|row| {
            format!(
                "<tr><th>{}</th><td>{}</td><td>{}</td></tr>",
                row.index,
                row.formatted_date(),
                row.price
            )
        })
        .collect();

    Ok(format!(
        r#"<div id="grafico-previsao" style="width:100%;height:500px;"></div>
<script>
const figura = {figure};
Plotly.newPlot("grafico-previsao", figura.data, figura.layout);
</script>
<p>{caption}</p>
<div class="tabela">
<table>
<thead><tr><th></th><th>{date_label}</th><th>{price_label}</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</div>
<p><a href="/previsao.csv" download="{file_name}">{DOWNLOAD_LABEL}</a></p>
"#,
        caption = escape_html(&output.table.caption()),
        date_label = escape_html(common::DATE_COLUMN_LABEL),
        price_label = escape_html(common::PRICE_COLUMN_LABEL),
        file_name = escape_html(&output.file_name),
    ))
}

const MODEL_CODE: &str = r#"import pandas as pd
import plotly.express as px
import numpy as np
from prophet import Prophet
import matplotlib.pyplot as plt
from sklearn.metrics import mean_squared_error, mean_absolute_error

url = "https://raw.githubusercontent.com/pedrowebster/Prophet_alura/refs/heads/main/df.csv"

df = pd.read_csv(url)
df = df.drop(df.columns[0], axis=1)
df.columns = ["Data", "Preco"]
df["Preco"] = pd.to_numeric(df["Preco"], errors="coerce").astype("Int64")
df["Preco"] = df["Preco"]/100
df["Data"] = pd.to_datetime(df["Data"], format="%d/%m/%Y", errors="coerce")
df = df.sort_index(ascending=False).reset_index()
df.drop(df.columns[0], axis = 1, inplace=True)

df_prophet = pd.DataFrame()
df_prophet['ds'] = df['Data']
df_prophet['y'] = df['Preco']

data_de_corte = df_prophet['ds'].max()
data_de_corte = data_de_corte - pd.DateOffset(years=1)

df_prophet_2 = df_prophet[df_prophet['ds'] >= data_de_corte]
df_prophet_2.reset_index(inplace=True)
fig = px.line(df_prophet_2, x='ds', y='y')

tamanho_treino = int(len(df_prophet_2)* 0.8)
tamanho_teste = int(len(df_prophet_2) * 0.2)

df_treino = pd.DataFrame()
df_treino['ds'] = df_prophet_2['ds'][:tamanho_treino]
df_treino['y'] = df_prophet_2['y'][:tamanho_treino]

df_teste = pd.DataFrame()
df_teste['ds'] = df_prophet_2['ds'][tamanho_treino:]
df_teste['y'] = df_prophet_2['y'][tamanho_treino:]

# CRIANDO O MODELO
# Definir um seed
np.random.seed(4587)

# Instanciar o modelo Prophet
modelo = Prophet(yearly_seasonality=True)

# Treinar o modelo
modelo.fit(df_treino)

# Criar um dataframe para previsões futuras
futuro = modelo.make_future_dataframe(periods = tamanho_teste, freq='B')
previsao = modelo.predict(futuro)

# AVALIANDO MÉTRICAS DE ACURÁRIA
mse = mean_squared_error(df_comparacao['y'], df_comparacao['yhat']).round(2)
rmse = np.sqrt(mse).round(2)
mape = mean_absolute_error(df_comparacao['y'], df_comparacao['yhat']).round(2)"#;

fn code_tab() -> String {
    format!(
        r#"<p>Abaixo segue o código em python da construção do modelo utilizando a biblioteca Prophet. Para ter acesso ao código na integra, acessar o jupyter notebook (TechChallenge_prophet_v2.ipynb) disponibilizado.</p>
<pre><code class="language-python">{code}</code></pre>
<p><small>Também foi construído um modelo secundário, presente no jupyter notebook TechChallengeXGBoost.ipynb, no entanto, este não foi escolhido pois apresentou métricas de acurácia menores.</small></p>"#,
        code = escape_html(MODEL_CODE),
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute::testing::fixture_model;
    use compute::{SessionContext, TrainedModel, render};

    fn page(tab: Tab, forecast: Option<&RenderOutput>) -> String {
        render_page(&PageView {
            tab,
            horizon: Horizon::default(),
            dashboard_url: crate::config::DEFAULT_DASHBOARD_URL,
            forecast,
        })
        .unwrap()
    }

    #[test]
    fn test_tab_from_param_falls_back_to_introduction() {
        assert_eq!(Tab::from_param(Some("modelo")), Tab::Modelo);
        assert_eq!(Tab::from_param(Some("codigo")), Tab::Codigo);
        assert_eq!(Tab::from_param(Some("nope")), Tab::Introducao);
        assert_eq!(Tab::from_param(None), Tab::Introducao);
    }

    #[test]
    fn test_members_are_sorted() {
        let members = members_sorted();
        assert_eq!(members[0], "Alessandra Renata Brunelli");
        assert_eq!(members[4], "Renata Oliveira de Jesus");
        assert!(members.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_every_tab_shows_title_and_tab_labels() {
        for tab in Tab::ALL {
            let html = page(tab, None);
            assert!(html.contains("Tech Challenge Fase 4 - Pós-Tech FIAP"));
            for label in ["Introdução", "Dashboard &amp; Insights", "Modelo Preditivo", "Código do Modelo"] {
                assert!(html.contains(label), "missing tab {label}");
            }
        }
    }

    #[test]
    fn test_model_tab_without_forecast_has_only_the_form() {
        let html = page(Tab::Modelo, None);
        assert!(html.contains(r#"min="1" max="30" step="1" value="1""#));
        assert!(html.contains(PREDICT_LABEL));
        assert!(!html.contains(DOWNLOAD_LABEL));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[test]
    fn test_model_tab_with_forecast_shows_chart_table_and_download() {
        let model = fixture_model();
        let mut context = SessionContext::new();
        context.submit(&model, Horizon::new(2).unwrap()).unwrap();
        let output = render(&context, model.history()).unwrap().unwrap();

        let html = page(Tab::Modelo, Some(&output));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("<td>10-09-2024</td><td>81.48</td>"));
        assert!(html.contains("<td>11-09-2024</td><td>82.48</td>"));
        assert!(html.contains("previsao_petroleo_2dias.csv"));
        assert!(html.contains(DOWNLOAD_LABEL));
    }

    #[test]
    fn test_code_listing_is_escaped() {
        let html = page(Tab::Codigo, None);
        assert!(html.contains("df_prophet[df_prophet[&#39;ds&#39;] &gt;= data_de_corte]"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
