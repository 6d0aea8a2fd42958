/*!

# Quick start with Google Forms

This example runs a questionnaire end to end, using an online form to collect
the responses. It uses Google Forms because it is free to use and scales to
large groups; other providers (Microsoft, Qualtrics) offer similar systems.

**Creating the form** Create a new Form in Google Drive with one short-answer
question for the participant id, name and team, and then one
**Multiple Choice** question per questionnaire item with the five scale
options, from `Strongly agree` down to `Strongly disagree`. Keep the question
order identical to the `questions` array of your definition file.

**Collecting responses** Share the form with the participants. After the
collection is closed, open the `Responses` tab and use the
`Create spreadsheet` option, then download the spreadsheet on your computer
in the **Excel format** (xlsx).

Run `personaq` with the following command (the file name may differ for you):

```bash
personaq --config team_quiz.json -i 'team quiz (Responses).xlsx' --input-type xlsx
```

Since the form stores labels rather than raw scale values, list the five
labels in the `answerLabels` entry of the definition file. The first column
of a Forms export is the submission timestamp, which is picked up through the
`timestampColumn` source setting.

After the run you should see one result per participant in the JSON summary
on the standard output, each with the six persona scores, the persona
percentage breakdown and the leader/player split:

```text
[2024-06-03T09:21:12Z INFO  persona_scoring] Questionnaire: 16 questions, 6 declared categories, 6 score keys
[2024-06-03T09:21:12Z INFO  persona_scoring] run_scoring: processing 2 responses over 16 questions
[2024-06-03T09:21:12Z INFO  persona_scoring] run_scoring: 2 results
```

**Appending rows to a spreadsheet** If the definition file carries an
`export.appsScriptUrl` endpoint, passing `--export` pushes one row per result
to it:

```bash
personaq --config team_quiz.json -i 'team quiz (Responses).xlsx' --input-type xlsx --export
```

The endpoint is a thin row-append proxy (a Google Apps Script web app bound
to a spreadsheet); see the repository README for the deployment steps. A
health check is issued before the first append and logged.

**Interactive sessions** Without a response file, a single session can be run
directly on the terminal:

```bash
personaq --interactive
```

This walks through intake (id, name, team) and the full question sequence,
prints the breakdown, and exports the result when `--export` is passed.

*/
